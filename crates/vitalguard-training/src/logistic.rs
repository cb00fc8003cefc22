//! L2-regularized logistic regression fitted with Newton's method.
//!
//! Minimizes
//!
//! ```text
//! ½‖w‖² + C · Σᵢ sᵢ · (log(1 + e^{zᵢ}) − yᵢ·zᵢ),   zᵢ = b + w·xᵢ
//! ```
//!
//! where `sᵢ` are per-sample weights. The intercept `b` is not penalized. With six
//! features the Hessian is a 7×7 matrix, so each Newton step solves a small dense
//! system directly; a backtracking line search keeps every step a descent step.

use vitalguard_data::VitalFeature;

use crate::{
    TrainError,
    classifier::{Classifier, ClassifierKind, Row},
    config::LogisticParams,
};

const DIM: usize = VitalFeature::LEN + 1;

#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    intercept: f64,
    coef: Row,
    iterations: usize,
}

impl LogisticRegression {
    /// Fits the model on standardized rows.
    ///
    /// # Panics
    ///
    /// Panics if `rows`, `labels` and `sample_weights` differ in length.
    pub fn fit(
        rows: &[Row],
        labels: &[u8],
        sample_weights: &[f64],
        params: &LogisticParams,
    ) -> Result<Self, TrainError> {
        assert_eq!(rows.len(), labels.len());
        assert_eq!(rows.len(), sample_weights.len());

        let problem = Problem {
            rows,
            labels,
            sample_weights,
            c: params.c,
        };
        let mut beta = [0.0; DIM];
        let mut objective = problem.objective(&beta);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < params.max_iter {
            let (gradient, hessian) = problem.gradient_and_hessian(&beta);
            if gradient.iter().all(|g| g.abs() < params.tol) {
                converged = true;
                break;
            }
            iterations += 1;
            let step = solve(hessian, gradient).ok_or_else(|| TrainError::Solver {
                model: ClassifierKind::LogisticRegression.name(),
                reason: format!("singular Hessian at iteration {iterations}"),
            })?;

            let mut t = 1.0;
            let mut candidate = beta;
            let mut candidate_objective = objective;
            let slope: f64 = gradient.iter().zip(&step).map(|(g, s)| g * s).sum();
            while t > 1e-10 {
                candidate = std::array::from_fn(|j| beta[j] - t * step[j]);
                candidate_objective = problem.objective(&candidate);
                if candidate_objective <= objective - 1e-4 * t * slope {
                    break;
                }
                t *= 0.5;
            }

            let max_update = beta
                .iter()
                .zip(&candidate)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            beta = candidate;
            objective = candidate_objective;
            log::trace!("logistic regression: iteration {iterations}, objective {objective}, max update {max_update:e}");
            if max_update < params.tol {
                converged = true;
                break;
            }
        }

        if converged {
            log::debug!("logistic regression converged after {iterations} iterations");
        } else {
            log::warn!(
                "logistic regression did not converge within {} iterations",
                params.max_iter
            );
        }

        Ok(Self {
            intercept: beta[0],
            coef: std::array::from_fn(|j| beta[j + 1]),
            iterations,
        })
    }

    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficients on the standardized features, in canonical order.
    #[must_use]
    pub fn coef(&self) -> &Row {
        &self.coef
    }

    /// Number of Newton iterations the fit took.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn decision_function(&self, row: &Row) -> f64 {
        self.intercept + dot(&self.coef, row)
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::LogisticRegression
    }

    fn predict_proba_row(&self, row: &Row) -> f64 {
        sigmoid(self.decision_function(row))
    }

    fn raw_importances(&self) -> Option<Row> {
        Some(self.coef.map(f64::abs))
    }
}

struct Problem<'a> {
    rows: &'a [Row],
    labels: &'a [u8],
    sample_weights: &'a [f64],
    c: f64,
}

impl Problem<'_> {
    fn samples(&self) -> impl Iterator<Item = (&Row, f64, f64)> + '_ {
        self.rows
            .iter()
            .zip(self.labels)
            .zip(self.sample_weights)
            .map(|((row, &y), &s)| (row, f64::from(y), s))
    }

    fn objective(&self, beta: &[f64; DIM]) -> f64 {
        let penalty = 0.5 * beta[1..].iter().map(|b| b * b).sum::<f64>();
        let loss: f64 = self
            .samples()
            .map(|(row, y, s)| {
                let z = linear(beta, row);
                s * (softplus(z) - y * z)
            })
            .sum();
        penalty + self.c * loss
    }

    fn gradient_and_hessian(&self, beta: &[f64; DIM]) -> ([f64; DIM], [[f64; DIM]; DIM]) {
        let mut gradient = [0.0; DIM];
        let mut hessian = [[0.0; DIM]; DIM];
        for (row, y, s) in self.samples() {
            let p = sigmoid(linear(beta, row));
            let x = augmented(row);
            let g = self.c * s * (p - y);
            let h = self.c * s * p * (1.0 - p);
            for j in 0..DIM {
                gradient[j] += g * x[j];
                for k in 0..=j {
                    hessian[j][k] += h * x[j] * x[k];
                }
            }
        }
        for j in 0..DIM {
            for k in 0..j {
                hessian[k][j] = hessian[j][k];
            }
        }
        for j in 1..DIM {
            gradient[j] += beta[j];
            hessian[j][j] += 1.0;
        }
        (gradient, hessian)
    }
}

fn augmented(row: &Row) -> [f64; DIM] {
    std::array::from_fn(|j| if j == 0 { 1.0 } else { row[j - 1] })
}

fn linear(beta: &[f64; DIM], row: &Row) -> f64 {
    beta[0] + dot(&beta[1..], row)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `log(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Solves `a · x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` if `a` is (numerically) singular.
fn solve(mut a: [[f64; DIM]; DIM], mut b: [f64; DIM]) -> Option<[f64; DIM]> {
    for col in 0..DIM {
        let pivot = (col..DIM).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 || !a[pivot][col].is_finite() {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..DIM {
            let factor = a[row][col] / a[col][col];
            for k in col..DIM {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; DIM];
    for row in (0..DIM).rev() {
        let tail: f64 = (row + 1..DIM).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
