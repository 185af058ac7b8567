//! Pipeline layer: the fitted transforms and the classifier.
//!
//! Fit order is encoder → scaler → classifier. Every stage consumes and
//! produces a [`Frame`] whose [`FeatureSchema`](crate::domain::FeatureSchema)
//! is checked against the schema the stage was fitted on.

mod classifier;
mod encoder;
mod frame;
mod scaler;
mod split;

pub use classifier::{RecurrenceClassifier, VAR_SMOOTHING};
pub use encoder::{OneHotEncoder, UnknownCategoryPolicy};
pub use frame::Frame;
pub use scaler::RobustScaler;
pub use split::train_test_split;
