use crate::{
    error::Error,
    record::{ContributionDate, Record},
};

/// Latest contribution year present in the FEC dataset the tool was built for.
pub const DEFAULT_MAX_YEAR: u32 = 2018;

const ZIP_LEN: usize = 5;

// Positions in the FEC itcont layout.
const CMTE_ID: usize = 0;
const NAME: usize = 7;
const ZIP_CODE: usize = 10;
const TRANSACTION_DT: usize = 13;
const TRANSACTION_AMT: usize = 14;
const OTHER_ID: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub max_year: u32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules {
            max_year: DEFAULT_MAX_YEAR,
        }
    }
}

/// The handful of itcont fields the analysis needs, as found on the line.
#[derive(Debug, PartialEq)]
struct ParsedRecord {
    committee_id: String,
    name: String,
    zip: String,
    date: String,
    amount: String,
    other_id: String,
}

impl ParsedRecord {
    fn from_fields(fields: &csv::ByteRecord) -> Result<Self, Error> {
        let field = |idx: usize, name: &'static str| {
            fields
                .get(idx)
                .map(|raw| String::from_utf8_lossy(raw).into_owned())
                .ok_or(Error::MissingField(name))
        };
        Ok(ParsedRecord {
            committee_id: field(CMTE_ID, "CMTE_ID")?,
            name: field(NAME, "NAME")?,
            zip: field(ZIP_CODE, "ZIP_CODE")?,
            date: field(TRANSACTION_DT, "TRANSACTION_DT")?,
            amount: field(TRANSACTION_AMT, "TRANSACTION_AMT")?,
            other_id: field(OTHER_ID, "OTHER_ID")?,
        })
    }

    /// Checks run in a fixed order; the first failing one names the rejection.
    fn validate(self, rules: &ValidationRules) -> Result<Record, Error> {
        if !self.other_id.is_empty() {
            return Err(Error::NotIndividual(self.other_id));
        }
        if self.zip.chars().count() < ZIP_LEN {
            return Err(Error::InvalidZip(self.zip));
        }
        let zip: String = self.zip.chars().take(ZIP_LEN).collect();
        if self.committee_id.is_empty() {
            return Err(Error::MissingField("CMTE_ID"));
        }
        if self.amount.is_empty() {
            return Err(Error::MissingField("TRANSACTION_AMT"));
        }
        let amount = match self.amount.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount >= 0.0 => amount,
            _ => return Err(Error::InvalidAmount(self.amount)),
        };
        if self.name.is_empty() {
            return Err(Error::MissingField("NAME"));
        }
        if self.date.is_empty() {
            return Err(Error::MissingField("TRANSACTION_DT"));
        }
        let date = ContributionDate::parse(&self.date)?;
        if !in_range(&date, rules) {
            return Err(Error::InvalidDate(self.date));
        }
        Ok(Record {
            committee_id: self.committee_id,
            name: self.name,
            zip,
            date,
            amount,
        })
    }
}

fn in_range(date: &ContributionDate, rules: &ValidationRules) -> bool {
    let number = |s: &str| s.parse::<u32>().ok();
    match (number(&date.month), number(&date.day), number(&date.year)) {
        (Some(month), Some(day), Some(year)) => {
            (1..=12).contains(&month) && (1..=31).contains(&day) && year <= rules.max_year
        }
        _ => false,
    }
}

/// Reader settings for the pipe-delimited itcont format: no header, no quoting,
/// trailing fields may be missing.
pub fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .quoting(false);
    builder
}

/// Tokenize and validate every line, in input order.
pub fn parse<'a, R>(
    rdr: csv::Reader<R>,
    rules: &'a ValidationRules,
) -> impl Iterator<Item = Result<Record, Error>> + 'a
where
    R: std::io::Read + 'a,
{
    rdr.into_byte_records().map(move |fields| {
        let fields = fields?;
        ParsedRecord::from_fields(&fields)?.validate(rules)
    })
}

/// The percentile is the first line of its source, an integer in 1..=100.
pub fn parse_percentile(input: &str) -> Result<u32, Error> {
    let line = input.lines().next().unwrap_or_default().trim();
    match line.parse::<u32>() {
        Ok(percentile) if (1..=100).contains(&percentile) => Ok(percentile),
        _ => Err(Error::InvalidPercentile(line.to_string())),
    }
}

#[cfg(test)]
mod tests {
    mod parsing {
        use crate::error::Error;
        use crate::parser::{parse, reader_builder, ValidationRules};
        use crate::record::{ContributionDate, Record};

        /// Build an itcont line with 21 fields, filling the unused ones.
        fn line(
            cmte: &str,
            name: &str,
            zip: &str,
            date: &str,
            amt: &str,
            other: &str,
        ) -> String {
            [
                cmte, "N", "M2", "P", "201702039042410894", "15", "IND", name, "ALPHARETTA",
                "GA", zip, "UNUM", "SVP, SALES, CL", date, amt, other, "PR2283873845050",
                "1147350", "", "P/R DEDUCTION ($192.00 BI-WEEKLY)", "4020820171370029337",
            ]
            .join("|")
        }

        fn parse_with(input: &str, rules: &ValidationRules) -> Vec<Result<Record, Error>> {
            let rdr = reader_builder().from_reader(input.as_bytes());
            parse(rdr, rules).collect()
        }

        macro_rules! parse {
            ($($field:expr),*) => {{
                parse_with(&line($($field),*), &ValidationRules::default())
            }};
        }

        #[test]
        fn valid_record() {
            assert_eq!(
                parse!("C00177436", "DEEHAN, WILLIAM N", "300047357", "01312017", "384", ""),
                vec![Ok(Record {
                    committee_id: "C00177436".to_string(),
                    name: "DEEHAN, WILLIAM N".to_string(),
                    zip: "30004".to_string(),
                    date: ContributionDate::parse("01312017").unwrap(),
                    amount: 384.0,
                })]
            );
        }

        #[test]
        fn zip_length_boundaries() {
            assert_eq!(
                parse!("C1", "A", "0050", "01312017", "1", ""),
                vec![Err(Error::InvalidZip("0050".to_string()))]
            );
            assert!(matches!(
                &parse!("C1", "A", "00501", "01312017", "1", "")[..],
                [Ok(Record { zip, .. })] if zip == "00501"
            ));
            assert!(matches!(
                &parse!("C1", "A", "005011234", "01312017", "1", "")[..],
                [Ok(Record { zip, .. })] if zip == "00501"
            ));
            assert_eq!(
                parse!("C1", "A", "", "01312017", "1", ""),
                vec![Err(Error::InvalidZip("".to_string()))]
            );
        }

        #[test]
        fn other_id_excludes_record() {
            assert_eq!(
                parse!("C1", "A", "00501", "01312017", "1", "H6CA34245"),
                vec![Err(Error::NotIndividual("H6CA34245".to_string()))]
            );
        }

        #[test]
        fn required_fields() {
            assert_eq!(
                parse!("", "A", "00501", "01312017", "1", ""),
                vec![Err(Error::MissingField("CMTE_ID"))]
            );
            assert_eq!(
                parse!("C1", "A", "00501", "01312017", "", ""),
                vec![Err(Error::MissingField("TRANSACTION_AMT"))]
            );
            assert_eq!(
                parse!("C1", "", "00501", "01312017", "1", ""),
                vec![Err(Error::MissingField("NAME"))]
            );
            assert_eq!(
                parse!("C1", "A", "00501", "", "1", ""),
                vec![Err(Error::MissingField("TRANSACTION_DT"))]
            );
        }

        #[test]
        fn amounts() {
            assert!(matches!(
                &parse!("C1", "A", "00501", "01312017", "12.75", "")[..],
                [Ok(Record { amount, .. })] if *amount == 12.75
            ));
            assert!(matches!(
                &parse!("C1", "A", "00501", "01312017", "0", "")[..],
                [Ok(_)]
            ));
            assert!(matches!(
                &parse!("C1", "A", "00501", "01312017", " 384 ", "")[..],
                [Ok(Record { amount, .. })] if *amount == 384.0
            ));
            for bad in ["-1", "ten", "NaN", "inf", " "] {
                assert_eq!(
                    parse!("C1", "A", "00501", "01312017", bad, ""),
                    vec![Err(Error::InvalidAmount(bad.to_string()))]
                );
            }
        }

        #[test]
        fn date_ranges() {
            for bad in ["00312017", "13312017", "01002017", "01322017", "01012019", "0131201"] {
                assert_eq!(
                    parse!("C1", "A", "00501", bad, "1", ""),
                    vec![Err(Error::InvalidDate(bad.to_string()))]
                );
            }
            assert!(matches!(
                &parse!("C1", "A", "00501", "12312018", "1", "")[..],
                [Ok(_)]
            ));
        }

        #[test]
        fn max_year_is_configurable() {
            let input = line("C1", "A", "00501", "01012019", "1", "");
            assert!(matches!(
                &parse_with(&input, &ValidationRules { max_year: 2019 })[..],
                [Ok(_)]
            ));
            assert!(matches!(
                &parse_with(&input, &ValidationRules { max_year: 2018 })[..],
                [Err(Error::InvalidDate(_))]
            ));
        }

        #[test]
        fn short_line_is_missing_fields() {
            assert_eq!(
                parse_with("C1|N|M2|P", &ValidationRules::default()),
                vec![Err(Error::MissingField("NAME"))]
            );
        }

        #[test]
        fn quotes_are_plain_text() {
            assert!(matches!(
                &parse!("C1", "O\"BRIEN, \"PAT\"", "00501", "01312017", "1", "")[..],
                [Ok(Record { name, .. })] if name == "O\"BRIEN, \"PAT\""
            ));
        }

        #[test]
        fn lines_keep_input_order() {
            let input = [
                line("C1", "A", "00501", "01312017", "1", ""),
                line("C2", "B", "0050", "01312017", "2", ""),
                line("C3", "C", "00501", "01312017", "3", ""),
            ]
            .join("\n");
            let parsed = parse_with(&input, &ValidationRules::default());
            assert_eq!(parsed.len(), 3);
            assert!(matches!(&parsed[0], Ok(Record { committee_id, .. }) if committee_id == "C1"));
            assert!(parsed[1].as_ref().unwrap_err().is_malformed_input());
            assert!(matches!(&parsed[2], Ok(Record { committee_id, .. }) if committee_id == "C3"));
        }
    }

    mod percentile {
        use crate::error::Error;
        use crate::parser::parse_percentile;

        #[test]
        fn first_line_is_used() {
            assert_eq!(parse_percentile("30\n"), Ok(30));
            assert_eq!(parse_percentile(" 100 \nignored"), Ok(100));
            assert_eq!(parse_percentile("1"), Ok(1));
        }

        #[test]
        fn out_of_range_or_garbage() {
            for bad in ["0", "101", "-5", "thirty", ""] {
                assert_eq!(
                    parse_percentile(bad),
                    Err(Error::InvalidPercentile(bad.to_string()))
                );
            }
        }
    }
}
