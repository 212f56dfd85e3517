use crate::{
	error::{self, Error},
	host::{Host, Scalar},
	node::{Properties, Style, Value, KEY},
};
use tracing::{instrument, trace, trace_span, warn};

/// DOM properties that are assigned live rather than serialised into attributes, where the host supports them.
pub const REFLECTED_PROPERTIES: &[&str] = &["value", "checked", "selected", "disabled", "readOnly", "multiple", "hidden", "indeterminate"];

/// Properties that are compared against their live value instead of the previous descriptor, since user input changes them.
const LIVE_COMPARED: &[&str] = &["value", "checked"];

/// Applies the difference between `old` and `new` onto `node`.
///
/// Only changed properties are touched. Pass an empty `old` to (re)apply everything, which leaves attributes not
/// mentioned in `new` untouched.
#[instrument(skip(host, old, new))]
pub fn patch_properties<H: Host>(host: &mut H, node: &H::Node, old: &Properties<H::Event>, new: &Properties<H::Event>, svg: bool) -> Result<(), Error<H::Error>> {
	for name in old.names().filter(|name| new.get(name).is_none()) {
		apply(host, node, name, old.get(name), None, svg)?;
	}

	for (name, value) in new.iter() {
		let old_value = old.get(name);
		let live = LIVE_COMPARED.contains(&name) && is_live_property(host, node, name, svg);
		let changed = if live {
			// Compared in the live property's own type, since the DOM coerces on assignment.
			host.property(node, name).map_or(true, |current| scalar(name, Some(value)).coerce_like(&current) != current)
		} else {
			old_value != Some(value)
		};
		if changed {
			apply(host, node, name, old_value, Some(value), svg)?;
		}
	}
	Ok(())
}

fn is_live_property<H: Host>(host: &H, node: &H::Node, name: &str, svg: bool) -> bool {
	!svg && REFLECTED_PROPERTIES.contains(&name) && host.has_property(node, name)
}

/// The live value a property is set to. Absent values reset to the DOM default.
fn scalar<E>(name: &str, value: Option<&Value<E>>) -> Scalar {
	match value {
		Some(Value::Text(text)) => Scalar::Text(text.clone()),
		Some(Value::Bool(value)) => Scalar::Bool(*value),
		Some(Value::Style(style)) => Scalar::Text(style.to_css()),
		None | Some(Value::Handler(_)) if name == "value" => Scalar::Text(String::new()),
		None | Some(Value::Handler(_)) => Scalar::Bool(false),
	}
}

fn apply<H: Host>(host: &mut H, node: &H::Node, name: &str, old: Option<&Value<H::Event>>, new: Option<&Value<H::Event>>, svg: bool) -> Result<(), Error<H::Error>> {
	if name == KEY {
		return Ok(());
	}

	let span = trace_span!("Applying property", name, ?new);
	let _enter = span.enter();

	if name == "style" {
		return apply_style(host, node, old, new);
	}

	let old_handler = old.and_then(Value::as_handler);
	let new_handler = new.and_then(Value::as_handler);
	if let Some(event) = name.strip_prefix("on") {
		if old_handler.is_some() || new_handler.is_some() {
			let event = event.to_ascii_lowercase();
			trace!(%event, bound = new_handler.is_some(), "Updating listener");
			host.set_listener(node, &event, new_handler.cloned()).map_err(error::host("set listener"))?;
			if matches!(new, None | Some(Value::Handler(_))) {
				return Ok(());
			}
		}
	} else if new_handler.is_some() {
		warn!("Event handler assigned to {:?}, which isn't an `on…` property. Ignoring.", name);
		return Ok(());
	}

	if is_live_property(host, node, name, svg) {
		host.set_property(node, name, scalar(name, new)).map_err(error::host("set property"))?;
	} else {
		match new {
			Some(Value::Text(text)) => host.set_attribute(node, name, text).map_err(error::host("set attribute"))?,
			Some(Value::Bool(true)) => host.set_attribute(node, name, "").map_err(error::host("set attribute"))?,
			Some(Value::Style(style)) => host.set_attribute(node, name, &style.to_css()).map_err(error::host("set attribute"))?,
			Some(Value::Bool(false)) | Some(Value::Handler(_)) | None => (),
		}
	}

	if matches!(new, None | Some(Value::Bool(false)) | Some(Value::Handler(_))) {
		host.remove_attribute(node, name).map_err(error::host("remove attribute"))?;
	}
	Ok(())
}

/// Patches individual declarations for [`Value::Style`] and replaces the whole attribute for anything else.
fn apply_style<H: Host>(host: &mut H, node: &H::Node, old: Option<&Value<H::Event>>, new: Option<&Value<H::Event>>) -> Result<(), Error<H::Error>> {
	let empty = Style::new();
	let old_style = match old {
		Some(Value::Style(style)) => style,
		Some(Value::Text(_)) => {
			host.remove_attribute(node, "style").map_err(error::host("remove attribute"))?;
			&empty
		}
		_ => &empty,
	};

	match new {
		Some(Value::Style(new_style)) => {
			for (property, _) in old_style.iter().filter(|(property, _)| new_style.get(property).is_none()) {
				host.set_style(node, property, None).map_err(error::host("clear style"))?;
			}
			for (property, value) in new_style.iter().filter(|&(property, value)| old_style.get(property) != Some(value)) {
				host.set_style(node, property, Some(value)).map_err(error::host("set style"))?;
			}
		}
		Some(Value::Text(css)) => host.set_attribute(node, "style", css).map_err(error::host("set attribute"))?,
		_ => {
			for (property, _) in old_style.iter() {
				host.set_style(node, property, None).map_err(error::host("clear style"))?;
			}
		}
	}
	Ok(())
}
