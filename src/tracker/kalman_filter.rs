//! Constant-velocity Kalman filter over the four corners of a quad.
//!
//! State is 16-dimensional: the eight corner coordinates (x0, y0, .., x3, y3)
//! in pixels followed by their per-frame velocities. Noise scales with the
//! quad's size, so large and small targets get comparable relative jitter.

use ndarray::{Array1, Array2};

/// Number of measured coordinates.
const NDIM: usize = 8;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    std_weight_position: f64,
    std_weight_velocity: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let mut motion_mat = Array2::eye(2 * NDIM);
        for i in 0..NDIM {
            motion_mat[[i, NDIM + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((NDIM, 2 * NDIM));
        for i in 0..NDIM {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
        }
    }

    pub fn initiate(&self, measurement: [f64; NDIM]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(2 * NDIM);
        for i in 0..NDIM {
            mean[i] = measurement[i];
        }

        let s = quad_scale(&mean);
        let mut cov = Array2::zeros((2 * NDIM, 2 * NDIM));
        for i in 0..NDIM {
            let pos = 2.0 * self.std_weight_position * s;
            let vel = 10.0 * self.std_weight_velocity * s;
            cov[[i, i]] = pos * pos;
            cov[[NDIM + i, NDIM + i]] = vel * vel;
        }

        (mean, cov)
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let s = quad_scale(mean);
        let mut motion_cov = Array2::zeros((2 * NDIM, 2 * NDIM));
        for i in 0..NDIM {
            let pos = self.std_weight_position * s;
            let vel = self.std_weight_velocity * s;
            motion_cov[[i, i]] = pos * pos;
            motion_cov[[NDIM + i, NDIM + i]] = vel * vel;
        }

        let new_mean = self.motion_mat.dot(mean);
        let new_covariance = self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + motion_cov;

        (new_mean, new_covariance)
    }

    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let s = quad_scale(mean);
        let mut innovation_cov = Array2::zeros((NDIM, NDIM));
        for i in 0..NDIM {
            let std = self.std_weight_position * s;
            innovation_cov[[i, i]] = std * std;
        }

        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + innovation_cov;

        (mean_proj, covariance_proj)
    }

    /// Correct the state with a corner measurement.
    ///
    /// Returns `None` if the innovation covariance is singular.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; NDIM],
    ) -> Option<(Array1<f64>, Array2<f64>)> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let measurement_arr = Array1::from_vec(measurement.to_vec());
        let innovation = measurement_arr - projected_mean;

        // K = P * H^T * S^-1, with H = [I 0] so P * H^T is the first 8 columns of P.
        let s_inv = invert_8x8(&projected_cov)?;

        let pht = covariance.dot(&self.update_mat.t()); // 16x8
        let kalman_gain = pht.dot(&s_inv); // 16x8

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        Some((new_mean, new_covariance))
    }
}

/// Corner coordinates held in the first eight entries of `mean`.
pub fn corners_of(mean: &Array1<f64>) -> [f64; NDIM] {
    let mut out = [0.0; NDIM];
    for (i, v) in out.iter_mut().enumerate() {
        *v = mean[i];
    }
    out
}

/// Square root of the quad's area, floored at one pixel.
fn quad_scale(mean: &Array1<f64>) -> f64 {
    let mut acc = 0.0;
    for i in 0..4 {
        let j = (i + 1) % 4;
        acc += mean[2 * i] * mean[2 * j + 1] - mean[2 * j] * mean[2 * i + 1];
    }
    (acc.abs() / 2.0).sqrt().max(1.0)
}

/// Invert an 8x8 matrix using nalgebra (pure Rust, no LAPACK).
fn invert_8x8(m: &Array2<f64>) -> Option<Array2<f64>> {
    let nm = nalgebra::SMatrix::<f64, NDIM, NDIM>::from_fn(|i, j| m[[i, j]]);
    let inv = nm.try_inverse()?;
    Some(Array2::from_shape_fn((NDIM, NDIM), |(i, j)| inv[(i, j)]))
}
