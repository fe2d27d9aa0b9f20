/// A 2D grid with equirectangular layout: columns wrap horizontally, rows
/// are clamped at the top and bottom edges.
#[derive(Clone, Debug)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> Tilemap<T> {
    /// Get the index into the data array, handling horizontal wrapping.
    fn index(&self, x: usize, y: usize) -> usize {
        let x = x % self.width; // Wrap horizontally
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Cells within `radius` of (x, y), including the center.
    ///
    /// X wraps; Y is clamped, so windows touching the top or bottom edge
    /// contain fewer rows. Each cell is listed once even when the window is
    /// wider than the map.
    pub fn window(&self, x: usize, y: usize, radius: usize) -> Vec<(usize, usize)> {
        let y_min = y.saturating_sub(radius);
        let y_max = (y + radius).min(self.height - 1);
        let cols = self.wrapped_columns(x as i64 - radius as i64, x as i64 + radius as i64);

        (y_min..=y_max)
            .flat_map(|ny| cols.iter().map(move |&nx| (nx, ny)))
            .collect()
    }

    /// Distinct columns in the inclusive, possibly out-of-range span
    /// `[from, to]`, wrapped onto the map.
    pub fn wrapped_columns(&self, from: i64, to: i64) -> Vec<usize> {
        let width = self.width as i64;
        if to - from + 1 >= width {
            return (0..self.width).collect();
        }
        (from..=to).map(|x| x.rem_euclid(width) as usize).collect()
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_wrap() {
        let mut map = Tilemap::new_with(4, 3, 0u8);
        map.set(5, 1, 7);
        assert_eq!(*map.get(1, 1), 7);
    }

    #[test]
    fn test_window_wraps_columns_and_clamps_rows() {
        let map: Tilemap<u8> = Tilemap::new(8, 4);

        let mut cells = map.window(0, 0, 1);
        cells.sort();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1), (7, 0), (7, 1)]);

        assert_eq!(map.window(3, 2, 1).len(), 9);
    }

    #[test]
    fn test_window_wider_than_map_has_no_duplicates() {
        let map: Tilemap<u8> = Tilemap::new(3, 2);
        let cells = map.window(1, 0, 2);
        assert_eq!(cells.len(), 6);
    }
}
