/*
 * Path segment helpers used to address nodes inside the cached folder tree and
 * to group proposed destination paths. Filesystem paths are compared component
 * by component through `std::path`, so the platform separator is respected.
 * Destination paths coming back from the classification service are plain
 * relative strings and may use either separator.
 */
use std::path::{Component, Path};

/*
 * Returns the segments of `target` that follow the point where it diverges
 * from `base`. Components are compared pairwise from the start, including the
 * root, and the walk stops at the first mismatch. Only named components are
 * returned, so an empty `target` (or one equal to `base`) yields no segments.
 */
pub fn relative_segments(target: &Path, base: &Path) -> Vec<String> {
    let target_components: Vec<Component> = target.components().collect();
    let base_components: Vec<Component> = base.components().collect();

    let shared = target_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(t, b)| t == b)
        .count();

    target_components[shared..]
        .iter()
        .filter_map(component_to_segment)
        .collect()
}

/*
 * All named components of a path, in order.
 */
pub fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| component_to_segment(&c))
        .collect()
}

fn component_to_segment(component: &Component) -> Option<String> {
    match component {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        Component::ParentDir => Some("..".to_string()),
        Component::RootDir | Component::Prefix(_) | Component::CurDir => None,
    }
}

/*
 * Splits a service-provided destination path such as `images/2024/a.jpg`.
 * Both `/` and `\` separate segments; empty segments are dropped.
 */
pub fn split_destination(destination: &str) -> Vec<&str> {
    destination
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect()
}
