//! `<import resource="..."/>` handling.

use indexmap::IndexSet;
use roxmltree::Node;

use super::context::ReaderContext;
use crate::error::{ReaderError, Result};
use crate::resource::{apply_relative_path, is_absolute_location, Resource};

/// Resolve an import directive and load the documents it names.
///
/// The location first has its `${...}` placeholders resolved. Absolute
/// locations (URLs and search-root prefixes) are loaded as given, possibly
/// matching several documents. Relative locations are resolved against the
/// importing document: a sibling that exists is loaded on its own,
/// otherwise the location is applied to the document's URL and loaded as a
/// pattern.
///
/// Failures are reported against the import element. An "import
/// processed" event with the loaded resources follows every attempted load.
///
/// # Errors
/// Only returns an error when the problem reporter escalates.
pub fn resolve_import(location: &str, element: Node<'_, '_>, ctx: &ReaderContext<'_>) -> Result<()> {
    let location = location.trim();
    if location.is_empty() {
        return ctx.error(
            element,
            ReaderError::structural("Resource location must not be empty"),
        );
    }

    let location = match ctx.environment().resolve_required_placeholders(location) {
        Ok(resolved) => resolved,
        Err(err) => return ctx.error(element, err),
    };

    let absolute = is_absolute_location(&location);
    let mut actual = IndexSet::new();
    let outcome = if absolute {
        import_absolute(&location, ctx, &mut actual)
    } else {
        import_relative(&location, ctx, &mut actual)
    };

    let reported = match outcome {
        Ok(count) => {
            tracing::debug!(
                location = %location,
                absolute,
                definitions = count,
                resources = actual.len(),
                "Imported definitions"
            );
            Ok(())
        }
        Err(err) => ctx.error(element, err),
    };

    ctx.fire_import_processed(&location, absolute, actual, element);
    reported
}

fn import_absolute(
    location: &str,
    ctx: &ReaderContext<'_>,
    actual: &mut IndexSet<Resource>,
) -> Result<usize> {
    ctx.load_from(location, actual)
        .map_err(|err| import_failed("absolute", location, err))
}

fn import_relative(
    location: &str,
    ctx: &ReaderContext<'_>,
    actual: &mut IndexSet<Resource>,
) -> Result<usize> {
    let current = ctx.resource();
    let relative = current
        .create_relative(location)
        .map_err(|err| current_location_failed(current, err))?;

    if ctx.resource_exists(&relative) {
        let count = ctx
            .load_resource(&relative)
            .map_err(|err| import_failed("relative", location, err))?;
        actual.insert(relative);
        return Ok(count);
    }

    let base = ctx
        .current_location()
        .map_err(|err| current_location_failed(current, err))?;
    let target = apply_relative_path(&base, location);
    tracing::trace!(location, target = %target, "Relative import does not exist as sibling");
    ctx.load_from(&target, actual)
        .map_err(|err| import_failed("relative", location, err))
}

fn import_failed(kind: &'static str, location: &str, err: ReaderError) -> ReaderError {
    match err {
        ReaderError::Escalated(_) => err,
        source => ReaderError::ImportFailed {
            kind,
            location: location.to_string(),
            source: Box::new(source),
        },
    }
}

fn current_location_failed(current: &Resource, err: ReaderError) -> ReaderError {
    ReaderError::CurrentLocation {
        location: current.description().to_string(),
        source: Box::new(err),
    }
}
