use super::variables::MinimizerVariables;
use bitflags::bitflags;
use tracing::trace;

pub const DEFAULT_STEP_SIZE: f64 = 0.001;
pub const DEFAULT_TOLERANCE: f64 = 0.15;

const RHO: f64 = 0.01;
const TAU1: f64 = 9.0;
const TAU2: f64 = 0.05;
const TAU3: f64 = 0.5;
const INTERPOLATION_ORDER: u32 = 3;
const LINE_SEARCH_ITERATIONS: usize = 100;

bitflags! {
    /// Outcome of a minimizer step or run.
    ///
    /// The empty set is plain success: a step was taken and no stopping criterion has
    /// been met yet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MinimizerStatus: u32 {
        /// The line search could not decrease the objective.
        const NO_PROGRESS = 1 << 0;
        /// The gradient norm fell to the requested threshold.
        const GNORM_REACHED = 1 << 1;
        /// The change in function value fell to the requested threshold.
        const DELTAF_REACHED = 1 << 2;
        /// The iteration budget was used up.
        const ITER_LIMIT_REACHED = 1 << 3;
        /// The line search produced a non-finite step.
        const LINE_SEARCH_FAILED = 1 << 4;
    }
}

impl MinimizerStatus {
    pub const SUCCESS: Self = Self::empty();

    pub fn is_success(&self) -> bool {
        self.is_empty()
    }

    /// True if a convergence threshold (gradient norm or function delta) was reached.
    pub fn is_converged(&self) -> bool {
        self.intersects(Self::GNORM_REACHED | Self::DELTAF_REACHED)
    }
}

/// Quasi-Newton minimizer with Fletcher's line search and a direct BFGS direction update.
///
/// `f` evaluates the objective; `fdf` evaluates the objective and writes the gradient
/// into its second argument. Both must be pure functions of the variables: line-search
/// evaluations are cached by step length.
pub struct BfgsMinimizer<V, F, G>
where
    V: MinimizerVariables,
    F: Fn(&V) -> f64,
    G: Fn(&V, &mut V) -> f64,
{
    f: F,
    fdf: G,
    step_size: f64,
    tolerance: f64,

    x0: V,
    g0: V,
    p: V,
    dx0: V,
    dg0: V,
    pnorm: f64,
    g0norm: f64,
    fp0: f64,
    delta_f: f64,
    f_value: f64,
    step: f64,

    search: LineSearchCache<V>,

    num_iterations: usize,
    status: MinimizerStatus,
    initialized: bool,
}

/// Function values along the current search direction, keyed by step length.
struct LineSearchCache<V> {
    x_alpha: V,
    g_alpha: V,
    f_alpha: f64,
    df_alpha: f64,
    x_key: f64,
    f_key: f64,
    df_key: f64,
    g_key: f64,
}

impl<V, F, G> BfgsMinimizer<V, F, G>
where
    V: MinimizerVariables,
    F: Fn(&V) -> f64,
    G: Fn(&V, &mut V) -> f64,
{
    /// Creates a minimizer over variables shaped like `template`.
    pub fn new(template: &V, f: F, fdf: G) -> Self {
        let zeros = template.zeros_like();
        Self {
            f,
            fdf,
            step_size: DEFAULT_STEP_SIZE,
            tolerance: DEFAULT_TOLERANCE,
            x0: zeros.clone(),
            g0: zeros.clone(),
            p: zeros.clone(),
            dx0: zeros.clone(),
            dg0: zeros.clone(),
            pnorm: 0.0,
            g0norm: 0.0,
            fp0: 0.0,
            delta_f: 0.0,
            f_value: 0.0,
            step: DEFAULT_STEP_SIZE,
            search: LineSearchCache {
                x_alpha: zeros.clone(),
                g_alpha: zeros,
                f_alpha: 0.0,
                df_alpha: 0.0,
                x_key: 0.0,
                f_key: 0.0,
                df_key: 0.0,
                g_key: 0.0,
            },
            num_iterations: 0,
            status: MinimizerStatus::SUCCESS,
            initialized: false,
        }
    }

    /// Sets the step size and line-search tolerance used when [`minimize`](Self::minimize)
    /// performs its own setup.
    pub fn with_line_search(mut self, step_size: f64, tolerance: f64) -> Self {
        self.step_size = step_size;
        self.tolerance = tolerance;
        self
    }

    /// Evaluates the start point and points the first search direction down the gradient.
    ///
    /// Writes the gradient at `x` into `grad` and returns the function value.
    pub fn setup(&mut self, x: &V, grad: &mut V, step_size: f64, tolerance: f64) -> f64 {
        self.step_size = step_size;
        self.tolerance = tolerance;
        self.step = step_size;
        self.delta_f = 0.0;
        self.num_iterations = 0;
        self.status = MinimizerStatus::SUCCESS;

        let f = (self.fdf)(x, grad);
        self.f_value = f;
        self.x0.assign(x);
        self.g0.assign(grad);
        self.g0norm = self.g0.norm2();

        self.p.assign(grad);
        if self.g0norm > 0.0 {
            self.p.scale(-1.0 / self.g0norm);
        } else {
            self.p.set_zero();
        }
        self.pnorm = self.p.norm2();
        self.fp0 = -self.g0norm;

        self.reset_line_search(f);
        self.initialized = true;
        f
    }

    /// Performs one line search along the current direction followed by the BFGS
    /// direction update.
    pub fn iterate(&mut self, f: &mut f64, x: &mut V, grad: &mut V) -> MinimizerStatus {
        if !self.initialized {
            self.setup(x, grad, self.step_size, self.tolerance);
            *f = self.f_value;
        }
        if self.pnorm == 0.0 || self.g0norm == 0.0 || self.fp0 == 0.0 {
            self.status = MinimizerStatus::NO_PROGRESS;
            return self.status;
        }

        let f0 = *f;
        let alpha1 = if self.delta_f < 0.0 {
            let del = (-self.delta_f).max(10.0 * f64::EPSILON * f0.abs());
            (2.0 * del / (-self.fp0)).min(1.0)
        } else {
            self.step.abs()
        };

        let alpha = match self.line_search(alpha1) {
            Ok(alpha) => alpha,
            Err(status) => {
                self.status = status;
                return status;
            }
        };

        let (f_new, _) = self.eval_fdf(alpha);
        *f = f_new;
        x.assign(&self.search.x_alpha);
        grad.assign(&self.search.g_alpha);
        self.delta_f = f_new - f0;
        self.f_value = f_new;
        self.step = alpha;

        self.dx0.assign_difference(x, &self.x0);
        self.dg0.assign_difference(grad, &self.g0);
        self.x0.assign(x);
        self.g0.assign(grad);

        let dxdg = self.dx0.dot(&self.dg0);
        let dxg = self.dx0.dot(grad);
        let dgg = self.dg0.dot(grad);
        let dgnorm = self.dg0.norm2();
        let (a, b) = if dxdg != 0.0 {
            let b = dxg / dxdg;
            (-(1.0 + dgnorm * dgnorm / dxdg) * b + dgg / dxdg, b)
        } else {
            (0.0, 0.0)
        };
        self.p.assign(grad);
        self.p.axpy(-a, &self.dx0);
        self.p.axpy(-b, &self.dg0);

        self.g0norm = self.g0.norm2();
        let pnorm = self.p.norm2();
        if pnorm > 0.0 {
            let dir = if self.p.dot(grad) > 0.0 { -1.0 } else { 1.0 };
            self.p.scale(dir / pnorm);
        }
        self.pnorm = self.p.norm2();
        self.fp0 = self.p.dot(&self.g0);
        self.reset_line_search(f_new);

        self.num_iterations += 1;
        self.status = MinimizerStatus::SUCCESS;
        trace!(
            iteration = self.num_iterations,
            f = f_new,
            gnorm = self.g0norm,
            alpha,
            "BFGS step"
        );
        self.status
    }

    /// Iterates until a stopping criterion is met.
    ///
    /// Negative thresholds disable the corresponding test; `max_iterations == 0` means no
    /// iteration limit. With `do_setup == false` the run continues from the current state,
    /// which lets callers split a minimization into chunks.
    pub fn minimize(
        &mut self,
        x: &mut V,
        grad: &mut V,
        max_iterations: usize,
        gradient_norm_threshold: f64,
        function_delta_threshold: f64,
        do_setup: bool,
    ) -> MinimizerStatus {
        if do_setup || !self.initialized {
            self.setup(x, grad, self.step_size, self.tolerance);
        }
        let mut f = self.f_value;
        let mut iterations = 0;
        loop {
            if max_iterations != 0 && iterations >= max_iterations {
                self.status = MinimizerStatus::ITER_LIMIT_REACHED;
                return self.status;
            }
            let status = self.iterate(&mut f, x, grad);
            iterations += 1;
            if !status.is_success() {
                return status;
            }

            let mut reached = MinimizerStatus::SUCCESS;
            if gradient_norm_threshold >= 0.0 && self.g0norm <= gradient_norm_threshold {
                reached |= MinimizerStatus::GNORM_REACHED;
            }
            if function_delta_threshold >= 0.0 && self.delta_f.abs() <= function_delta_threshold {
                reached |= MinimizerStatus::DELTAF_REACHED;
            }
            if !reached.is_empty() {
                self.status = reached;
                return reached;
            }
        }
    }

    pub fn gradient_norm(&self) -> f64 {
        self.g0norm
    }

    pub fn function_delta(&self) -> f64 {
        self.delta_f
    }

    pub fn function_value(&self) -> f64 {
        self.f_value
    }

    pub fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    pub fn status(&self) -> MinimizerStatus {
        self.status
    }

    fn reset_line_search(&mut self, f: f64) {
        let s = &mut self.search;
        s.x_alpha.assign(&self.x0);
        s.g_alpha.assign(&self.g0);
        s.x_key = 0.0;
        s.f_alpha = f;
        s.f_key = 0.0;
        s.g_key = 0.0;
        s.df_alpha = s.g_alpha.dot(&self.p);
        s.df_key = 0.0;
    }

    fn move_to(&mut self, alpha: f64) {
        if alpha == self.search.x_key {
            return;
        }
        self.search.x_alpha.assign(&self.x0);
        self.search.x_alpha.axpy(alpha, &self.p);
        self.search.x_key = alpha;
    }

    fn eval_f(&mut self, alpha: f64) -> f64 {
        if alpha == self.search.f_key {
            return self.search.f_alpha;
        }
        self.move_to(alpha);
        self.search.f_alpha = (self.f)(&self.search.x_alpha);
        self.search.f_key = alpha;
        self.search.f_alpha
    }

    fn eval_df(&mut self, alpha: f64) -> f64 {
        if alpha == self.search.df_key {
            return self.search.df_alpha;
        }
        self.move_to(alpha);
        if alpha != self.search.g_key {
            (self.fdf)(&self.search.x_alpha, &mut self.search.g_alpha);
            self.search.g_key = alpha;
        }
        self.search.df_alpha = self.search.g_alpha.dot(&self.p);
        self.search.df_key = alpha;
        self.search.df_alpha
    }

    fn eval_fdf(&mut self, alpha: f64) -> (f64, f64) {
        let s = &self.search;
        if alpha == s.f_key && alpha == s.df_key {
            return (s.f_alpha, s.df_alpha);
        }
        if alpha == s.f_key || alpha == s.df_key {
            return (self.eval_f(alpha), self.eval_df(alpha));
        }
        self.move_to(alpha);
        self.search.f_alpha = (self.fdf)(&self.search.x_alpha, &mut self.search.g_alpha);
        self.search.f_key = alpha;
        self.search.g_key = alpha;
        self.search.df_alpha = self.search.g_alpha.dot(&self.p);
        self.search.df_key = alpha;
        (self.search.f_alpha, self.search.df_alpha)
    }

    /// Fletcher's bracketing and sectioning line search.
    ///
    /// Returns the accepted step length. Exhausting the iteration budget accepts a zero
    /// step, which makes the next direction update fall back to the gradient.
    fn line_search(&mut self, alpha1: f64) -> Result<f64, MinimizerStatus> {
        let sigma = self.tolerance;
        let (f0, fp0) = self.eval_fdf(0.0);
        let mut alpha = alpha1;
        let mut alpha_prev = 0.0;
        let mut f_prev = f0;
        let mut fp_prev = fp0;

        let (mut a, mut b) = (0.0, alpha);
        let (mut fa, mut fb) = (f0, 0.0);
        let (mut fpa, mut fpb) = (fp0, 0.0);

        let mut i = 0;
        while i < LINE_SEARCH_ITERATIONS {
            i += 1;
            let f_alpha = self.eval_f(alpha);

            if f_alpha > f0 + alpha * RHO * fp0 || f_alpha >= f_prev {
                a = alpha_prev;
                fa = f_prev;
                fpa = fp_prev;
                b = alpha;
                fb = f_alpha;
                fpb = f64::NAN;
                break;
            }

            let fp_alpha = self.eval_df(alpha);
            if fp_alpha.abs() <= -sigma * fp0 {
                return Ok(alpha);
            }

            if fp_alpha >= 0.0 {
                a = alpha;
                fa = f_alpha;
                fpa = fp_alpha;
                b = alpha_prev;
                fb = f_prev;
                fpb = fp_prev;
                break;
            }

            let delta = alpha - alpha_prev;
            let next = interpolate(
                (alpha_prev, f_prev, fp_prev),
                (alpha, f_alpha, fp_alpha),
                alpha + delta,
                alpha + TAU1 * delta,
            );
            alpha_prev = alpha;
            f_prev = f_alpha;
            fp_prev = fp_alpha;
            alpha = next;
            if !alpha.is_finite() {
                return Err(MinimizerStatus::LINE_SEARCH_FAILED);
            }
        }

        while i < LINE_SEARCH_ITERATIONS {
            i += 1;
            let delta = b - a;
            alpha = interpolate((a, fa, fpa), (b, fb, fpb), a + TAU2 * delta, b - TAU3 * delta);
            if !alpha.is_finite() {
                return Err(MinimizerStatus::LINE_SEARCH_FAILED);
            }
            let f_alpha = self.eval_f(alpha);

            if (a - alpha) * fpa <= f64::EPSILON {
                return Err(MinimizerStatus::NO_PROGRESS);
            }

            if f_alpha > f0 + RHO * alpha * fp0 || f_alpha >= fa {
                b = alpha;
                fb = f_alpha;
                fpb = f64::NAN;
            } else {
                let fp_alpha = self.eval_df(alpha);
                if fp_alpha.abs() <= -sigma * fp0 {
                    return Ok(alpha);
                }
                if ((b - a) >= 0.0 && fp_alpha >= 0.0) || ((b - a) <= 0.0 && fp_alpha <= 0.0) {
                    b = a;
                    fb = fa;
                    fpb = fpa;
                }
                a = alpha;
                fa = f_alpha;
                fpa = fp_alpha;
            }
        }

        Ok(0.0)
    }
}

/// Minimizer of the interpolating polynomial through `lo` and `hi` (each a
/// `(position, value, slope)` triple) within `[x_min, x_max]`.
///
/// Uses a cubic when the slope at `hi` is known and a quadratic otherwise.
fn interpolate(lo: (f64, f64, f64), hi: (f64, f64, f64), x_min: f64, x_max: f64) -> f64 {
    let (a, fa, fpa) = lo;
    let (b, fb, fpb) = hi;
    let width = b - a;
    let mut z_min = (x_min - a) / width;
    let mut z_max = (x_max - a) / width;
    if z_min > z_max {
        std::mem::swap(&mut z_min, &mut z_max);
    }

    let z = if INTERPOLATION_ORDER > 2 && fpb.is_finite() {
        interp_cubic(fa, fpa * width, fb, fpb * width, z_min, z_max)
    } else {
        interp_quad(fa, fpa * width, fb, z_min, z_max)
    };
    a + z * width
}

fn interp_quad(f0: f64, fp0: f64, f1: f64, zl: f64, zh: f64) -> f64 {
    let value = |z: f64| f0 + z * (fp0 + z * (f1 - f0 - fp0));
    let (mut z_min, mut f_min) = (zl, value(zl));
    let fh = value(zh);
    if fh < f_min {
        z_min = zh;
        f_min = fh;
    }

    let curvature = 2.0 * (f1 - f0 - fp0);
    if curvature > 0.0 {
        let z = -fp0 / curvature;
        if z > zl && z < zh && value(z) < f_min {
            z_min = z;
        }
    }
    z_min
}

fn interp_cubic(f0: f64, fp0: f64, f1: f64, fp1: f64, zl: f64, zh: f64) -> f64 {
    let eta = 3.0 * (f1 - f0) - 2.0 * fp0 - fp1;
    let xi = fp0 + fp1 - 2.0 * (f1 - f0);
    let cubic = |z: f64| f0 + z * (fp0 + z * (eta + z * xi));

    let (mut z_min, mut f_min) = (zl, cubic(zl));
    let mut consider = |z: f64| {
        let y = cubic(z);
        if y < f_min {
            z_min = z;
            f_min = y;
        }
    };
    consider(zh);
    for z in solve_quadratic(3.0 * xi, 2.0 * eta, fp0).into_iter().flatten() {
        if z > zl && z < zh {
            consider(z);
        }
    }
    z_min
}

/// Real roots of `a z² + b z + c`, in ascending order.
fn solve_quadratic(a: f64, b: f64, c: f64) -> [Option<f64>; 2] {
    if a == 0.0 {
        return if b == 0.0 { [None, None] } else { [Some(-c / b), None] };
    }
    let disc = b * b - 4.0 * a * c;
    if disc > 0.0 {
        if b == 0.0 {
            let r = (0.5 * disc.sqrt() / a).abs();
            [Some(-r), Some(r)]
        } else {
            let temp = -0.5 * (b + b.signum() * disc.sqrt());
            let (r1, r2) = (temp / a, c / temp);
            [Some(r1.min(r2)), Some(r1.max(r2))]
        }
    } else if disc == 0.0 {
        let r = -0.5 * b / a;
        [Some(r), Some(r)]
    } else {
        [None, None]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DVector, Vector3};

    fn rosenbrock(x: &DVector<f64>) -> f64 {
        let (a, b) = (x[0], x[1]);
        (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2)
    }

    fn rosenbrock_fdf(x: &DVector<f64>, g: &mut DVector<f64>) -> f64 {
        let (a, b) = (x[0], x[1]);
        g[0] = -2.0 * (1.0 - a) - 400.0 * a * (b - a * a);
        g[1] = 200.0 * (b - a * a);
        rosenbrock(x)
    }

    fn bowl(x: &DVector<f64>) -> f64 {
        x.iter()
            .enumerate()
            .map(|(i, v)| (i as f64 + 1.0) * (v - 1.0).powi(2))
            .sum()
    }

    fn bowl_fdf(x: &DVector<f64>, g: &mut DVector<f64>) -> f64 {
        for i in 0..x.len() {
            g[i] = 2.0 * (i as f64 + 1.0) * (x[i] - 1.0);
        }
        bowl(x)
    }

    #[test]
    fn quadratic_bowl_decreases_monotonically() {
        let mut x = DVector::from_vec(vec![4.0, -3.0, 2.5, 0.0]);
        let mut g = x.zeros_like();
        let mut minimizer = BfgsMinimizer::new(&x, bowl, bowl_fdf);
        let mut f = minimizer.setup(&x, &mut g, 0.01, 0.1);
        for _ in 0..50 {
            let previous = f;
            let status = minimizer.iterate(&mut f, &mut x, &mut g);
            if !status.is_success() {
                break;
            }
            assert!(f <= previous, "{f} > {previous}");
            if minimizer.gradient_norm() < 1e-10 {
                break;
            }
        }
        assert!(f < 1e-8);
        assert!(x.iter().all(|v| (v - 1.0).abs() < 1e-4));
    }

    #[test]
    fn disabled_thresholds_run_exactly_max_iterations() {
        let mut x = DVector::from_vec(vec![-1.2, 1.0]);
        let mut g = x.zeros_like();
        let mut minimizer = BfgsMinimizer::new(&x, rosenbrock, rosenbrock_fdf);
        let status = minimizer.minimize(&mut x, &mut g, 10, -1.0, -1.0, true);
        assert_eq!(status, MinimizerStatus::ITER_LIMIT_REACHED);
        assert_eq!(minimizer.num_iterations(), 10);
        assert!(minimizer.function_value() < rosenbrock(&DVector::from_vec(vec![-1.2, 1.0])));
    }

    #[test]
    fn loose_gradient_threshold_stops_early() {
        let mut x = DVector::from_vec(vec![3.0, 3.0, 3.0]);
        let mut g = x.zeros_like();
        let mut minimizer = BfgsMinimizer::new(&x, bowl, bowl_fdf);
        let status = minimizer.minimize(&mut x, &mut g, 100, 1.0, -1.0, true);
        assert!(status.contains(MinimizerStatus::GNORM_REACHED));
        assert!(status.is_converged());
        assert!(minimizer.num_iterations() < 100);
        assert!(minimizer.gradient_norm() <= 1.0);
    }

    #[test]
    fn rosenbrock_converges_to_its_minimum() {
        let mut x = DVector::from_vec(vec![-1.2, 1.0]);
        let mut g = x.zeros_like();
        let mut minimizer = BfgsMinimizer::new(&x, rosenbrock, rosenbrock_fdf);
        let status = minimizer.minimize(&mut x, &mut g, 500, 1e-6, -1.0, true);
        assert!(
            status.contains(MinimizerStatus::GNORM_REACHED) || status == MinimizerStatus::NO_PROGRESS,
            "{status:?}"
        );
        assert!((x[0] - 1.0).abs() < 1e-3 && (x[1] - 1.0).abs() < 1e-3, "{x:?}");
    }

    #[test]
    fn chunked_minimization_continues_from_previous_state() {
        let mut x = DVector::from_vec(vec![-1.2, 1.0]);
        let mut g = x.zeros_like();
        let mut minimizer = BfgsMinimizer::new(&x, rosenbrock, rosenbrock_fdf);
        let mut total = 0;
        let mut status = minimizer.minimize(&mut x, &mut g, 5, 1e-6, -1.0, true);
        total += 5;
        while status == MinimizerStatus::ITER_LIMIT_REACHED && total < 500 {
            status = minimizer.minimize(&mut x, &mut g, 5, 1e-6, -1.0, false);
            total += 5;
        }
        assert!(minimizer.num_iterations() > 5);
        assert!(rosenbrock(&x) < 1e-6);
    }

    #[test]
    fn stationary_start_reports_no_progress() {
        let mut x = DVector::from_vec(vec![1.0, 1.0]);
        let mut g = x.zeros_like();
        let mut minimizer = BfgsMinimizer::new(&x, bowl, bowl_fdf);
        let status = minimizer.minimize(&mut x, &mut g, 10, -1.0, -1.0, true);
        assert_eq!(status, MinimizerStatus::NO_PROGRESS);
        assert_eq!(minimizer.num_iterations(), 0);
    }

    #[test]
    fn delta_f_threshold_is_reported() {
        let mut x = DVector::from_vec(vec![2.0, 2.0]);
        let mut g = x.zeros_like();
        let mut minimizer = BfgsMinimizer::new(&x, bowl, bowl_fdf);
        let status = minimizer.minimize(&mut x, &mut g, 0, -1.0, 1e3, true);
        assert!(status.contains(MinimizerStatus::DELTAF_REACHED));
        assert_eq!(minimizer.num_iterations(), 1);
    }

    #[test]
    fn minimizes_over_coordinate_arrays() {
        let target = [Vector3::new(1.0, 2.0, 3.0), Vector3::new(-1.0, 0.5, 0.0)];
        let f = |x: &Vec<Vector3<f64>>| -> f64 {
            x.iter().zip(&target).map(|(p, t)| (p - t).norm_squared()).sum()
        };
        let fdf = |x: &Vec<Vector3<f64>>, g: &mut Vec<Vector3<f64>>| -> f64 {
            for ((gi, p), t) in g.iter_mut().zip(x).zip(&target) {
                *gi = (p - t) * 2.0;
            }
            x.iter().zip(&target).map(|(p, t)| (p - t).norm_squared()).sum()
        };
        let mut x = vec![Vector3::zeros(); 2];
        let mut g = x.zeros_like();
        let mut minimizer = BfgsMinimizer::new(&x, f, fdf);
        minimizer.minimize(&mut x, &mut g, 100, 1e-8, -1.0, true);
        assert!((x[0] - target[0]).norm() < 1e-6);
        assert!((x[1] - target[1]).norm() < 1e-6);
    }

    #[test]
    fn quadratic_solver_orders_roots() {
        assert_eq!(solve_quadratic(1.0, -3.0, 2.0), [Some(1.0), Some(2.0)]);
        assert_eq!(solve_quadratic(0.0, 2.0, -4.0), [Some(2.0), None]);
        assert_eq!(solve_quadratic(1.0, 0.0, 1.0), [None, None]);
    }
}
