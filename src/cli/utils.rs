//! Utilities for parsing command line arguments.

use crate::{
    exit_on_error, exit_on_false,
    geometry::{Dim2, In2D, Point3},
    grid::fsr,
    num::BFloat,
};
use clap::ArgMatches;
use std::{fmt::Display, str::FromStr};

pub fn parse_value_string<T>(argument_name: &str, value_string: &str) -> T
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    exit_on_error!(
        value_string.trim().parse(),
        "Error: Could not parse value for {0}: {1}",
        argument_name
    )
}

fn parse_value_strings<'a, T, I>(argument_name: &str, value_strings: I) -> Vec<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
    I: Iterator<Item = &'a str>,
{
    value_strings
        .filter(|value_string| !value_string.is_empty())
        .map(|value_string| parse_value_string(argument_name, value_string))
        .collect()
}

fn verify_finite_float_value<F: BFloat>(argument_name: &str, value: F) {
    exit_on_false!(value.is_finite(), "Error: {} must be finite", argument_name);
}

fn verify_argument_value_count<T>(argument_name: &str, values: &[T], required_count: usize) {
    let count = values.len();
    exit_on_false!(
        count == required_count,
        "Error: {} must have {} values, got {}",
        argument_name,
        required_count,
        count
    );
}

pub fn get_value_from_parseable_argument<T>(arguments: &ArgMatches, argument_name: &str) -> Option<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    arguments
        .get_one::<String>(argument_name)
        .map(|value_string| parse_value_string(argument_name, value_string))
}

pub fn get_value_from_required_parseable_argument<T>(arguments: &ArgMatches, argument_name: &str) -> T
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    parse_value_string(
        argument_name,
        arguments
            .get_one::<String>(argument_name)
            .expect("No value for required argument"),
    )
}

pub fn get_finite_float_value_from_required_parseable_argument<F>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> F
where
    F: BFloat + FromStr,
    <F as FromStr>::Err: Display,
{
    let value: F = get_value_from_required_parseable_argument(arguments, argument_name);
    verify_finite_float_value(argument_name, value);
    value
}

pub fn get_values_from_parseable_argument<T>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> Option<Vec<T>>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    arguments.get_many::<String>(argument_name).map(|values| {
        parse_value_strings(argument_name, values.map(String::as_str))
    })
}

pub fn get_finite_float_values_from_parseable_argument<F>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> Option<Vec<F>>
where
    F: BFloat + FromStr,
    <F as FromStr>::Err: Display,
{
    let values = get_values_from_parseable_argument(arguments, argument_name);
    if let Some(values) = values.as_ref() {
        values
            .iter()
            .for_each(|&value| verify_finite_float_value(argument_name, value))
    };
    values
}

/// Parses a `LOWER,UPPER` argument, requiring finite values with `LOWER < UPPER`.
pub fn parse_limits<F>(arguments: &ArgMatches, argument_name: &str) -> (F, F)
where
    F: BFloat + FromStr + Display,
    <F as FromStr>::Err: Display,
{
    let limits: Vec<F> = get_finite_float_values_from_parseable_argument(arguments, argument_name)
        .expect("No value for argument with default");
    verify_argument_value_count(argument_name, &limits, 2);

    let (lower_limit, upper_limit) = (limits[0], limits[1]);
    exit_on_false!(
        upper_limit > lower_limit,
        "Error: Second value in {} ({}) must be larger than first value ({})",
        argument_name,
        upper_limit,
        lower_limit
    );
    (lower_limit, upper_limit)
}

/// Parses an `X,Y` argument, requiring each value to be at least `min_value`.
pub fn parse_2d_values<T>(arguments: &ArgMatches, argument_name: &str, min_value: T) -> In2D<T>
where
    T: FromStr + PartialOrd + Display + Copy,
    <T as FromStr>::Err: Display,
{
    let values: Vec<T> = get_values_from_parseable_argument(arguments, argument_name)
        .expect("No value for argument with default");
    verify_argument_value_count(argument_name, &values, 2);

    for dim in Dim2::slice() {
        let value = values[dim.num()];
        exit_on_false!(
            value >= min_value,
            "Error: {} value for {} must be at least {}, got {}",
            dim,
            argument_name,
            min_value,
            value
        );
    }
    In2D::new(values[0], values[1])
}

/// Parses a point given as `X,Y` or `X,Y,Z`, with `Z` zero when omitted.
pub fn parse_point(argument_name: &str, point_string: &str) -> Point3<fsr> {
    let components: Vec<fsr> = parse_value_strings(argument_name, point_string.split(','));
    exit_on_false!(
        components.len() == 2 || components.len() == 3,
        "Error: Points in {} must have 2 or 3 components, got {}",
        argument_name,
        point_string
    );
    components
        .iter()
        .for_each(|&value| verify_finite_float_value(argument_name, value));
    Point3::new(
        components[0],
        components[1],
        components.get(2).copied().unwrap_or(0.0),
    )
}
