//! Features/labels split performed at submission

use polars::prelude::*;

/// Split a frame into features (every column but the target) and labels
pub fn split_features_labels(df: &DataFrame, target: &str) -> PolarsResult<(DataFrame, Column)> {
    let labels = df.column(target)?.clone();
    let features = df.drop(target)?;
    Ok((features, labels))
}
