//! Enumeration of candidate routes through the base tokens

use itertools::Itertools;

use crate::types::{Route, Token};

/// The default maximum number of pairs a route may traverse
pub const DEFAULT_MAX_HOPS: usize = 2;

/// Build every token pair among the input, the output, and the base tokens
///
/// Bases that duplicate the input, the output, or another base are ignored
pub fn create_all_token_pairs(input: &Token, output: &Token, bases: &[Token]) -> Vec<(Token, Token)> {
    let tokens: Vec<&Token> =
        [input, output].into_iter().chain(bases.iter()).unique().collect();

    tokens.into_iter().tuple_combinations().map(|(a, b)| (a.clone(), b.clone())).collect()
}

/// Walk the pair graph from `input` to `output`, yielding every path of at most
/// `max_hops` pairs that never revisits a token
///
/// Routes are produced in a deterministic order, with the direct route first
/// when a direct pair exists
pub fn create_all_routes(
    pairs: &[(Token, Token)],
    input: &Token,
    output: &Token,
    max_hops: usize,
) -> Vec<Route> {
    let mut routes = Vec::new();
    if input == output || max_hops == 0 {
        return routes;
    }

    let mut path = vec![input.clone()];
    extend_routes(pairs, output, max_hops, &mut path, &mut routes);
    routes
}

/// Depth-first extension of `path` towards `output`
fn extend_routes(
    pairs: &[(Token, Token)],
    output: &Token,
    max_hops: usize,
    path: &mut Vec<Token>,
    routes: &mut Vec<Route>,
) {
    if path.len() > max_hops {
        return;
    }

    let current = path[path.len() - 1].clone();
    for (a, b) in pairs {
        let next = if *a == current {
            b
        } else if *b == current {
            a
        } else {
            continue;
        };

        if path.contains(next) {
            continue;
        }

        path.push(next.clone());
        if next == output {
            // The path never revisits a token and has at least two entries
            if let Ok(route) = Route::new(path.clone()) {
                routes.push(route);
            }
        } else {
            extend_routes(pairs, output, max_hops, path, routes);
        }
        path.pop();
    }
}
