//! Activity indicator advanced once per rendered update.

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];

#[derive(Debug, Clone, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    /// Returns the current frame and advances.
    pub fn next_frame(&mut self) -> char {
        let c = FRAMES[self.frame % FRAMES.len()];
        self.frame = self.frame.wrapping_add(1);
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles() {
        let mut s = Spinner::default();
        let frames: String = (0..5).map(|_| s.next_frame()).collect();
        assert_eq!(frames, "|/-\\|");
    }
}
