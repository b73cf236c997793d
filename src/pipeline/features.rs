//! Derived engagement features
//!
//! Each step takes the table by value and hands back the augmented table.
//! Steps only append columns (or overwrite a column of the same name in
//! place), so row count and row order never change.
//!
//! Zero divisors are not guarded: a zero total, `dias`, `visitas` or
//! `pviews` produces `inf` or `NaN` in the affected rows.

use polars::prelude::*;

use super::config::{FeatureConfig, DAYS_COLUMN, PAGE_VIEWS_COLUMN, VISITS_COLUMN};
use super::error::{FeatureError, FeatureResult};

pub const AVG_DAILY_TIME: &str = "tempo_medio_diario";
pub const AVG_VISIT_TIME: &str = "tempo_medio_visita";
pub const AVG_PAGE_TIME: &str = "tempo_medio_pagina";
pub const PAGES_PER_VISIT: &str = "pagina_por_visita";
pub const PAGES_PER_DAY: &str = "pagina_por_dia";
pub const VISITS_PER_DAY: &str = "visitas_por_dia";
pub const SPORT_COUNT: &str = "quantidade_modalidades";
pub const TOP_TIME_SHARE: &str = "top_tempo";

/// Fail with the first required column absent from `df`.
fn require_columns<'a, I>(df: &DataFrame, columns: I) -> FeatureResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    for name in columns {
        if df.get_column_index(name).is_none() {
            return Err(FeatureError::MissingColumn {
                column: name.to_string(),
            });
        }
    }
    Ok(())
}

fn float_col(name: &str) -> Expr {
    col(name).cast(DataType::Float64)
}

/// Step 1: total sport time and each sport's share of it.
///
/// Missing and `NaN` sport values count as zero in the total. A row whose
/// total is zero gets `NaN` in every `<sport>_perc` column.
pub fn add_sport_percentages(df: DataFrame, cfg: &FeatureConfig) -> FeatureResult<DataFrame> {
    require_columns(&df, cfg.sport_columns.iter().map(String::as_str))?;

    let total_name = cfg.total_time_name();
    let total = cfg
        .sport_columns
        .iter()
        .map(|name| float_col(name).fill_nan(lit(0.0)).fill_null(lit(0.0)))
        .reduce(|acc, expr| acc + expr)
        .unwrap_or_else(|| lit(0.0));

    let shares: Vec<Expr> = cfg
        .sport_columns
        .iter()
        .zip(cfg.perc_column_names())
        .map(|(name, perc)| (float_col(name) / col(total_name)).alias(perc))
        .collect();

    let out = df
        .lazy()
        .with_column(total.alias(total_name))
        .with_columns(shares)
        .collect()?;
    Ok(out)
}

/// Step 2: average time per day, per visit and per page view.
pub fn add_time_averages(df: DataFrame, cfg: &FeatureConfig) -> FeatureResult<DataFrame> {
    let total_name = cfg.total_time_name();
    require_columns(
        &df,
        [total_name, DAYS_COLUMN, VISITS_COLUMN, PAGE_VIEWS_COLUMN],
    )?;

    let out = df
        .lazy()
        .with_columns([
            (col(total_name) / float_col(DAYS_COLUMN)).alias(AVG_DAILY_TIME),
            (col(total_name) / float_col(VISITS_COLUMN)).alias(AVG_VISIT_TIME),
            (col(total_name) / float_col(PAGE_VIEWS_COLUMN)).alias(AVG_PAGE_TIME),
        ])
        .collect()?;
    Ok(out)
}

/// Step 3: page views per visit and per day, visits per day.
pub fn add_visit_ratios(df: DataFrame) -> FeatureResult<DataFrame> {
    require_columns(&df, [DAYS_COLUMN, VISITS_COLUMN, PAGE_VIEWS_COLUMN])?;

    let out = df
        .lazy()
        .with_columns([
            (float_col(PAGE_VIEWS_COLUMN) / float_col(VISITS_COLUMN)).alias(PAGES_PER_VISIT),
            (float_col(PAGE_VIEWS_COLUMN) / float_col(DAYS_COLUMN)).alias(PAGES_PER_DAY),
            (float_col(VISITS_COLUMN) / float_col(DAYS_COLUMN)).alias(VISITS_PER_DAY),
        ])
        .collect()?;
    Ok(out)
}

/// Step 4: how many sports a subject touched and the largest share.
///
/// A share counts towards `quantidade_modalidades` whenever it is not equal
/// to zero, so `NaN` shares from an all-zero row are counted too.
/// `top_tempo` skips `NaN` shares and is `NaN` only when every share is.
pub fn add_category_counts(df: DataFrame, cfg: &FeatureConfig) -> FeatureResult<DataFrame> {
    let perc_names = cfg.perc_column_names();
    require_columns(&df, perc_names.iter().map(String::as_str))?;

    let count = perc_names
        .iter()
        .map(|name| {
            col(name.as_str())
                .neq(lit(0.0))
                .fill_null(lit(true))
                .cast(DataType::Int64)
        })
        .reduce(|acc, expr| acc + expr)
        .unwrap_or_else(|| lit(0i64));

    // nulls are skipped by max_horizontal, NaN is not
    let shares: Vec<Expr> = perc_names
        .iter()
        .map(|name| col(name.as_str()).fill_nan(lit(NULL)))
        .collect();
    let top = if shares.is_empty() {
        lit(f64::NAN)
    } else {
        max_horizontal(shares)?.fill_null(lit(f64::NAN))
    };

    let out = df
        .lazy()
        .with_columns([count.alias(SPORT_COUNT), top.alias(TOP_TIME_SHARE)])
        .collect()?;
    Ok(out)
}

/// Run all four steps in order.
///
/// Running it again on its own output overwrites the derived columns with
/// identical values instead of appending duplicates.
pub fn derive_features(df: DataFrame, cfg: &FeatureConfig) -> FeatureResult<DataFrame> {
    let df = add_sport_percentages(df, cfg)?;
    let df = add_time_averages(df, cfg)?;
    let df = add_visit_ratios(df)?;
    add_category_counts(df, cfg)
}

/// Every column `derive_features` adds, in append order.
pub fn derived_column_names(cfg: &FeatureConfig) -> Vec<String> {
    let mut names = vec![cfg.total_time_name().to_string()];
    names.extend(cfg.perc_column_names());
    names.extend(
        [
            AVG_DAILY_TIME,
            AVG_VISIT_TIME,
            AVG_PAGE_TIME,
            PAGES_PER_VISIT,
            PAGES_PER_DAY,
            VISITS_PER_DAY,
            SPORT_COUNT,
            TOP_TIME_SHARE,
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    names
}
