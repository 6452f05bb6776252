//! InputValidator: the `ERR_INPUT_*`/`ERR_ARGS_INVALID` family of checks
//! run before DelaunayBuilder, per §7's "validation errors are additive"
//! policy — every violated condition contributes its own bit, and the
//! pipeline still attempts the stages it can.

use log::error;

use crate::geom::GeomKernel;
use crate::point::Point;
use crate::settings::Settings;
use crate::status::{Error, Status};

/// Runs every `ERR_INPUT_*`/`ERR_ARGS_INVALID` check against the raw
/// inputs, returning the additive status word and the list of specific
/// errors found (for verbose logging by the caller).
pub fn validate_input<T: GeomKernel>(
    positions: &[Point<T>],
    constraint_edges: &[usize],
    hole_seeds: &[Point<T>],
    ignore_constraint_for_planting: &[bool],
    settings: &Settings<T>,
) -> (Status, Vec<Error>) {
    let mut status = Status::empty();
    let mut errors = Vec::new();
    let mut push = |status: &mut Status, errors: &mut Vec<Error>, e: Error| {
        if settings.verbose {
            error!("{}", e);
        }
        status.push(&e);
        errors.push(e);
    };

    if settings.refinement_threshold_angle.to_f64() > Settings::<T>::max_refinement_threshold_angle()
    {
        push(
            &mut status,
            &mut errors,
            Error::ArgsInvalid {
                name: "refinement_threshold_angle",
                detail: format!(
                    "{} exceeds the maximum of {} (pi/4)",
                    settings.refinement_threshold_angle.to_f64(),
                    Settings::<T>::max_refinement_threshold_angle()
                ),
            },
        );
    }

    if positions.len() < 3 {
        push(
            &mut status,
            &mut errors,
            Error::InputPositionsLength(positions.len()),
        );
    }

    for (i, p) in positions.iter().enumerate() {
        if !p.is_finite() {
            push(&mut status, &mut errors, Error::InputPositionsUndefinedValue(i));
        }
    }

    if let Some(bound) = T::max_safe_coord() {
        for (i, p) in positions.iter().enumerate() {
            let (x, y) = p.to_f64();
            if x.abs() > bound || y.abs() > bound {
                push(
                    &mut status,
                    &mut errors,
                    Error::InputPositionsOutOfRange { index: i, bound },
                );
            }
        }
    }

    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            if positions[i].nearly_equals(positions[j]) {
                push(
                    &mut status,
                    &mut errors,
                    Error::InputPositionsDuplicates(i, j),
                );
            }
        }
    }

    if constraint_edges.len() % 2 != 0 {
        push(
            &mut status,
            &mut errors,
            Error::InputConstraintsLength(constraint_edges.len()),
        );
    }

    let pairs: Vec<(usize, usize)> = constraint_edges
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();

    for (idx, &(u, v)) in pairs.iter().enumerate() {
        if u >= positions.len() {
            push(
                &mut status,
                &mut errors,
                Error::InputConstraintsOutOfRange { pair: idx, index: u },
            );
        }
        if v >= positions.len() {
            push(
                &mut status,
                &mut errors,
                Error::InputConstraintsOutOfRange { pair: idx, index: v },
            );
        }
        if u == v {
            push(
                &mut status,
                &mut errors,
                Error::InputConstraintsSelfLoop(idx, u),
            );
        }
    }

    for (idx, &(u, v)) in pairs.iter().enumerate() {
        if u >= positions.len() || v >= positions.len() || u == v {
            continue;
        }
        let pu = positions[u];
        let pv = positions[v];
        for w in 0..positions.len() {
            if w == u || w == v {
                continue;
            }
            if T::point_on_segment(positions[w], pu, pv) {
                push(
                    &mut status,
                    &mut errors,
                    Error::InputConstraintsCollinear { pair: idx, vertex: w },
                );
            }
        }
    }

    for i in 0..pairs.len() {
        for j in (i + 1)..pairs.len() {
            let (u0, v0) = pairs[i];
            let (u1, v1) = pairs[j];
            let is_dup = (u0 == u1 && v0 == v1) || (u0 == v1 && v0 == u1);
            if is_dup {
                push(&mut status, &mut errors, Error::InputConstraintsDuplicates(i, j));
            }
        }
    }

    for i in 0..pairs.len() {
        for j in (i + 1)..pairs.len() {
            let (u0, v0) = pairs[i];
            let (u1, v1) = pairs[j];
            if u0 >= positions.len()
                || v0 >= positions.len()
                || u1 >= positions.len()
                || v1 >= positions.len()
            {
                continue;
            }
            // Constraints sharing an endpoint are allowed to touch there.
            if u0 == u1 || u0 == v1 || v0 == u1 || v0 == v1 {
                continue;
            }
            if T::segments_properly_intersect(
                positions[u0],
                positions[v0],
                positions[u1],
                positions[v1],
            ) {
                push(
                    &mut status,
                    &mut errors,
                    Error::InputConstraintsIntersecting(i, j),
                );
            }
        }
    }

    for (i, p) in hole_seeds.iter().enumerate() {
        if !p.is_finite() {
            push(&mut status, &mut errors, Error::InputHolesUndefinedValue(i));
        }
    }

    if !ignore_constraint_for_planting.is_empty()
        && ignore_constraint_for_planting.len() != pairs.len()
    {
        push(
            &mut status,
            &mut errors,
            Error::InputIgnoredConstraintsLength {
                actual: ignore_constraint_for_planting.len(),
                expected: pairs.len(),
            },
        );
    }

    (status, errors)
}
