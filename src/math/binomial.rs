//! Binomial distribution primitives used for rank-response confidence bands.
//!
//! Trial counts are small (at most a few hundred rank bins), so the CDF is
//! a running PMF sum and the inverse CDF is a linear scan.

const LOWER_TAIL: f64 = 0.025;
const UPPER_TAIL: f64 = 0.975;

/// Binomial helper owning a growable `ln(n!)` table.
#[derive(Debug, Clone)]
pub struct Binomial {
    ln_fact: Vec<f64>,
}

impl Default for Binomial {
    fn default() -> Self {
        Self::new()
    }
}

impl Binomial {
    pub fn new() -> Self {
        Self { ln_fact: vec![0.0] }
    }

    pub fn ln_factorial(&mut self, n: u64) -> f64 {
        let n = n as usize;
        while self.ln_fact.len() <= n {
            let k = self.ln_fact.len();
            let prev = self.ln_fact[k - 1];
            self.ln_fact.push(prev + (k as f64).ln());
        }
        self.ln_fact[n]
    }

    /// `ln C(n, k)`; negative infinity when `k > n`.
    pub fn ln_choose(&mut self, n: u64, k: u64) -> f64 {
        if k > n {
            return f64::NEG_INFINITY;
        }
        self.ln_factorial(n) - self.ln_factorial(k) - self.ln_factorial(n - k)
    }

    pub fn pmf(&mut self, n: u64, k: u64, p: f64) -> f64 {
        if k > n {
            return 0.0;
        }
        if p <= 0.0 {
            return if k == 0 { 1.0 } else { 0.0 };
        }
        if p >= 1.0 {
            return if k == n { 1.0 } else { 0.0 };
        }
        let ln = self.ln_choose(n, k) + k as f64 * p.ln() + (n - k) as f64 * (1.0 - p).ln();
        ln.exp()
    }

    pub fn cdf(&mut self, n: u64, k: u64, p: f64) -> f64 {
        let upto = k.min(n);
        let mut acc = 0.0;
        for i in 0..=upto {
            acc += self.pmf(n, i, p);
        }
        acc.min(1.0)
    }

    /// Smallest `k` with `CDF(k) >= target`; `n` if rounding never gets there.
    pub fn inverse_cdf(&mut self, n: u64, p: f64, target: f64) -> u64 {
        let mut acc = 0.0;
        for k in 0..=n {
            acc += self.pmf(n, k, p);
            if acc.min(1.0) >= target {
                return k;
            }
        }
        n
    }

    /// Two-sided 95% interval of the success count, as a fraction of `n`.
    pub fn confidence_interval_95(&mut self, n: u64, p: f64) -> (f64, f64) {
        if n == 0 {
            return (0.0, 0.0);
        }
        let nf = n as f64;
        let lower = self.inverse_cdf(n, p, LOWER_TAIL) as f64 / nf;
        let upper = self.inverse_cdf(n, p, UPPER_TAIL) as f64 / nf;
        (lower, upper)
    }

    pub fn cached_len(&self) -> usize {
        self.ln_fact.len()
    }
}
