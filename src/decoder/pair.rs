//! Summary producer for the `eastl::pair` layout. Stateless: the two
//! named members are resolved and rendered on every call.

use crate::error::DecodeError;
use crate::session::InspectSession;
use crate::value::Field;
use crate::weak_error;
use anyhow::Context;

/// Renders `"(<first>, <second>)"` using the host-default rendering of
/// each member. Degrades to an empty string if either member cannot be
/// resolved or rendered.
pub fn summarize<S: InspectSession>(session: &S, region: Field) -> String {
    weak_error!(
        try_summarize(session, region).context("pair interpretation")
    )
    .unwrap_or_default()
}

fn try_summarize<S: InspectSession>(session: &S, region: Field) -> Result<String, DecodeError> {
    let first = region.member(session, "first")?;
    let second = region.member(session, "second")?;

    let first = session.render_field(&first)?;
    let second = session.render_field(&second)?;
    Ok(format!("({first}, {second})"))
}
