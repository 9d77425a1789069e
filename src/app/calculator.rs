use crate::app::error::AppError;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectionInput {
    pub annual_rate_percent: f64,
    pub principal: f64,
    pub years: u32,
}

impl ProjectionInput {
    pub fn project(&self) -> ProjectionResult {
        compute(self.principal, self.annual_rate_percent, self.years)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectionRow {
    pub year: u32,
    pub total: f64,
}

impl ProjectionRow {
    /// Total as shown in the table and written to the csv.
    pub fn display_total(&self) -> String {
        format!("{:.2}", self.total)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectionResult {
    rows: Vec<ProjectionRow>,
}

impl ProjectionResult {
    pub fn rows(&self) -> &[ProjectionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `[year, total]` pairs for the chart, taken from the same rows as the table.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.rows
            .iter()
            .map(|row| [row.year as f64, row.total])
            .collect()
    }
}

/// Year-end totals with interest compounded once a year.
///
/// The total is accumulated year by year rather than derived from
/// `principal * (1 + rate)^year`, so every row carries the rounding of the
/// rows before it.
pub fn compute(principal: f64, annual_rate_percent: f64, years: u32) -> ProjectionResult {
    let rate = annual_rate_percent / 100.0;
    let mut total = principal;
    let rows = (1..=years)
        .map(|year| {
            total += total * rate;
            ProjectionRow { year, total }
        })
        .collect();

    ProjectionResult { rows }
}

/// Raw text of the three input fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Form {
    pub rate: String,
    pub principal: String,
    pub years: String,
}

impl Form {
    pub fn clear(&mut self) {
        self.rate.clear();
        self.principal.clear();
        self.years.clear();
    }

    pub fn parse(&self, max_years: u32) -> Result<ProjectionInput, AppError> {
        let annual_rate_percent = parse_real("rate", &self.rate)?;
        let principal = parse_real("principal", &self.principal)?;
        let years = self
            .years
            .trim()
            .parse::<u32>()
            .map_err(|_| AppError::InputParse { field: "years" })?;

        if years > max_years {
            return Err(AppError::YearsOutOfRange {
                years,
                max: max_years,
            });
        }

        Ok(ProjectionInput {
            annual_rate_percent,
            principal,
            years,
        })
    }
}

fn parse_real(field: &'static str, text: &str) -> Result<f64, AppError> {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(AppError::InputParse { field }),
    }
}
