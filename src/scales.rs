/// Linear mapping from a value domain onto a pixel range.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// A degenerate domain is widened by half a unit each way so that a
    /// constant series lands in the middle of the range.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (mut d_min, mut d_max) = domain;
        if (d_max - d_min).abs() < f64::EPSILON {
            d_min -= 0.5;
            d_max += 0.5;
        }
        Self {
            domain: (d_min, d_max),
            range,
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        let t = (value - self.domain.0) / (self.domain.1 - self.domain.0);
        let res = self.range.0 + t * (self.range.1 - self.range.0);
        if res.is_finite() {
            res
        } else {
            self.range.0
        }
    }
}
