//! # u-inference
//!
//! Statistical inference primitives for the U-Engine ecosystem.
//!
//! This crate turns group summaries and raw samples into interpretable
//! hypothesis-test results. It knows nothing about CSV parsing, report
//! layout, or any consumer domain: callers build [`GroupData`] and embed the
//! returned [`StatisticalTestResult`] wherever they need it.
//!
//! ## Modules
//!
//! - [`special`]: Log-gamma, regularized incomplete beta and gamma, erf
//! - [`distributions`]: F, chi-squared, and Student-t CDFs and survival functions
//! - [`hypothesis`]: ANOVA, Kruskal-Wallis, Welch's t, Mann-Whitney U, Anderson-Darling
//! - [`guards`]: Input validation and finiteness checks
//! - [`rank`]: Midranks and tie terms
//! - [`stats`]: Descriptive statistics with numerical stability guarantees
//! - [`config`]: Significance level and test tunables
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: Lanczos log-gamma, Lentz continued
//!   fractions, survival functions computed directly rather than as `1 − cdf`
//! - **No leaks of NaN or ∞ into p-values**: degenerate inputs take explicit
//!   branches, and every p-value lies in `[0, 1]`
//! - **Deterministic and stateless**: no global state, safe to call across
//!   thousands of columns
//! - **Property-based testing**: Mathematical invariants verified via proptest
//!
//! ## Example
//!
//! ```
//! use u_inference::{anova_f_test, GroupData};
//!
//! let groups = [
//!     GroupData::new("A", 5, 10.0, 4.0),
//!     GroupData::new("B", 5, 20.0, 4.0),
//!     GroupData::new("C", 5, 30.0, 4.0),
//! ];
//! let result = anova_f_test(&groups)?;
//! assert!(result.is_significant());
//! println!("{}", result.interpretation.summary);
//! # Ok::<(), u_inference::StatsError>(())
//! ```

pub mod config;
pub mod distributions;
pub mod error;
pub mod group;
pub mod guards;
pub mod hypothesis;
pub mod rank;
pub mod result;
pub mod special;
pub mod stats;

pub use config::{TestConfig, WelchPValue};
pub use error::{StatsError, StatsResult};
pub use group::GroupData;
pub use hypothesis::{
    anderson_darling_test, anderson_darling_test_with, anova_f_test, anova_f_test_with,
    kruskal_wallis_test, kruskal_wallis_test_with, mann_whitney_u_test,
    mann_whitney_u_test_with, welchs_t_test, welchs_t_test_with,
};
pub use result::{
    ApproximationReason, DegreesOfFreedom, EffectMagnitude, Interpretation,
    StatisticalTestResult, TestMode,
};
