use ndarray::{Array1, Array2};

use super::types::Comparison;

/// Logistic function, `P(i beats j)` for a log-strength difference `z`.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow for large `z`.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Penalized Bradley-Terry negative log-likelihood over a comparison set.
///
/// `f(θ) = -Σ [y·z - ln(1 + e^z)] + ½·λ·‖θ‖²` with `z = θ_i - θ_j`.
/// Every solver minimizes this same function through `value`, `gradient`
/// and `hessian`.
#[derive(Debug, Clone, Copy)]
pub struct Objective<'a> {
    comparisons: &'a [Comparison],
    n: usize,
    regularization: f64,
}

impl<'a> Objective<'a> {
    pub fn new(comparisons: &'a [Comparison], n: usize, regularization: f64) -> Self {
        Self {
            comparisons,
            n,
            regularization,
        }
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn regularization(&self) -> f64 {
        self.regularization
    }

    pub fn comparisons(&self) -> &'a [Comparison] {
        self.comparisons
    }

    pub fn value(&self, theta: &Array1<f64>) -> f64 {
        let nll: f64 = self
            .comparisons
            .iter()
            .map(|c| {
                let z = theta[c.i] - theta[c.j];
                softplus(z) - c.outcome() * z
            })
            .sum();
        nll + 0.5 * self.regularization * theta.dot(theta)
    }

    /// Gradient of `value`: residuals `y - p` are subtracted at `i` and
    /// added at `j`, plus the ridge term.
    pub fn gradient(&self, theta: &Array1<f64>) -> Array1<f64> {
        let mut grad = theta * self.regularization;
        for c in self.comparisons {
            let residual = c.outcome() - sigmoid(theta[c.i] - theta[c.j]);
            grad[c.i] -= residual;
            grad[c.j] += residual;
        }
        grad
    }

    pub fn value_and_gradient(&self, theta: &Array1<f64>) -> (f64, Array1<f64>) {
        (self.value(theta), self.gradient(theta))
    }

    /// Fisher information plus `λ·I`.
    pub fn hessian(&self, theta: &Array1<f64>) -> Array2<f64> {
        let mut hess = Array2::<f64>::eye(self.n) * self.regularization;
        for c in self.comparisons {
            let p = sigmoid(theta[c.i] - theta[c.j]);
            let w = p * (1.0 - p);
            hess[[c.i, c.i]] += w;
            hess[[c.j, c.j]] += w;
            hess[[c.i, c.j]] -= w;
            hess[[c.j, c.i]] -= w;
        }
        hess
    }
}
