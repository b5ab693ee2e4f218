/// Per-pixel occupancy shape. Rows are packed into `u64` words, least
/// significant bit first; bits past `width` are always zero.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl std::fmt::Debug for Bitmask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("set", &self.count())
            .finish()
    }
}

impl Bitmask {
    pub fn new(width: u32, height: u32) -> Self {
        let words_per_row = (width as usize).div_ceil(64);
        Self { width, height, words_per_row, bits: vec![0; words_per_row * height as usize] }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let word = self.bits[y as usize * self.words_per_row + x as usize / 64];
        (word >> (x % 64)) & 1 == 1
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let word = &mut self.bits[y as usize * self.words_per_row + x as usize / 64];
        let bit = 1u64 << (x % 64);
        if on { *word |= bit } else { *word &= !bit }
    }

    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn flipped_vertical(&self) -> Self {
        let mut out = Self::new(self.width, self.height);
        let w = self.words_per_row;
        for y in 0..self.height as usize {
            let src = (self.height as usize - 1 - y) * w;
            out.bits[y * w..(y + 1) * w].copy_from_slice(&self.bits[src..src + w]);
        }
        out
    }

    fn word(&self, y: usize, index: i64) -> u64 {
        if index < 0 || index >= self.words_per_row as i64 {
            return 0;
        }
        self.bits[y * self.words_per_row + index as usize]
    }

    // 64 bits of row `y` starting at column `x`; columns outside the mask read as zero.
    fn window(&self, y: usize, x: i64) -> u64 {
        let index = x.div_euclid(64);
        let shift = x.rem_euclid(64) as u32;
        let lo = self.word(y, index) >> shift;
        let hi = if shift == 0 { 0 } else { self.word(y, index + 1) << (64 - shift) };
        lo | hi
    }

    /// First set pixel shared with `other` placed at `offset` relative to this
    /// mask's origin, in this mask's coordinates.
    pub fn overlap(&self, other: &Bitmask, offset: (i32, i32)) -> Option<(u32, u32)> {
        let (ox, oy) = (offset.0 as i64, offset.1 as i64);
        let x0 = ox.max(0);
        let x1 = (ox + other.width as i64).min(self.width as i64);
        let y0 = oy.max(0);
        let y1 = (oy + other.height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        for y in y0..y1 {
            let row = y as usize;
            let other_row = (y - oy) as usize;
            for index in (x0 / 64)..=((x1 - 1) / 64) {
                let mine = self.word(row, index);
                if mine == 0 {
                    continue;
                }
                let theirs = other.window(other_row, index * 64 - ox);
                let hit = mine & theirs;
                if hit != 0 {
                    let x = index as u32 * 64 + hit.trailing_zeros();
                    return Some((x, y as u32));
                }
            }
        }
        None
    }

    pub fn overlaps(&self, other: &Bitmask, offset: (i32, i32)) -> bool {
        self.overlap(other, offset).is_some()
    }
}
