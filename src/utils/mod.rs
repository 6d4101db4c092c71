use std::fmt;
use std::time::Instant;

/// A simple timer based on std::time::Instant that prints the elapsed wall time.
pub struct Timer {
    time: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Timer { time: Instant::now() }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.time.elapsed().as_secs_f64()
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:>68} {:>8.2} s", "elapsed time:", self.elapsed_seconds())
    }
}
