#[cfg(test)]
#[path = "./breakpoints_test.rs"]
mod breakpoints_test;

/// source lines the debugger breaks on, kept sorted
#[derive(Default)]
pub struct Breakpoints {
    lines: Vec<usize>,
}

impl Breakpoints {
    pub fn new() -> Self {
        Breakpoints::default()
    }

    /// returns false when the line was already present
    pub fn add(&mut self, line: usize) -> bool {
        match self.lines.binary_search(&line) {
            Ok(_) => false,
            Err(at) => {
                self.lines.insert(at, line);
                true
            }
        }
    }

    pub fn remove(&mut self, line: usize) -> bool {
        match self.lines.binary_search(&line) {
            Ok(at) => {
                self.lines.remove(at);
                true
            }
            Err(_) => false,
        }
    }

    pub fn hit(&self, line: usize) -> bool {
        self.lines.binary_search(&line).is_ok()
    }

    pub fn get(&self) -> &[usize] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
