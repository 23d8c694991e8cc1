pub mod asset_ops;
pub mod check;
pub mod comment_ops;
pub mod drag;
pub mod projection;
pub mod task_ops;

/// Next id for `prefix`, one past the highest `<prefix>-<N>` among `existing`.
///
/// Ids are formatted as `<prefix>-<NNN>`. Numbers are never reused while a
/// higher one is still present. `None` when the highest number cannot be
/// incremented.
pub fn next_id<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let prefix_dash = format!("{}-", prefix);
    let max = existing
        .into_iter()
        .filter_map(|id| id.strip_prefix(&prefix_dash))
        .filter_map(|n| n.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    let next = max.checked_add(1)?;
    Some(format!("{}-{:03}", prefix, next))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
