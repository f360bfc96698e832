/// Hands out sequential identifiers, starting at one.
#[derive(Debug)]
pub struct IdCounter {
    value: u32,
}

impl Default for IdCounter {
    fn default() -> Self {
        IdCounter { value: 1 }
    }
}

impl IdCounter {
    #[inline]
    pub fn next(&mut self) -> u32 {
        let value = self.value;
        self.value += 1;
        value
    }

    /// Number of identifiers handed out so far.
    #[inline]
    pub fn issued(&self) -> u32 {
        self.value - 1
    }
}
