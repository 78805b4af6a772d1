use tracing::{debug, info};

use crate::{
    aggregate::Groups,
    donor::{DonorHistory, Observation},
    error::Error,
    parser::{parse, reader_builder, ValidationRules},
    record::{DonorKey, GroupKey, Record, RepeatDonation},
};

/// Both lookup tables of a run. Records must be processed in input order:
/// every output line depends on the lines folded into its group before it.
#[derive(Debug, Default)]
pub struct DonationAnalyzer {
    donors: DonorHistory,
    groups: Groups,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub records_read: usize,
    pub records_skipped: usize,
    pub lines_written: usize,
}

impl DonationAnalyzer {
    /// Classify a validated record. Only a donor seen in an earlier year yields a line.
    pub fn process(
        &mut self,
        record: &Record,
        percentile: u32,
    ) -> Result<Option<RepeatDonation>, Error> {
        match self.donors.observe(DonorKey::of(record), &record.date) {
            Observation::FirstSeen | Observation::Rebased { .. } => Ok(None),
            Observation::Repeat { previous_year } => {
                let key = GroupKey::of(record);
                debug!(
                    committee_id = %key.committee_id,
                    zip = %key.zip,
                    year = %key.year,
                    %previous_year,
                    "repeat donor"
                );
                let stats = self.groups.fold(key.clone(), record.amount, percentile)?;
                Ok(Some(RepeatDonation {
                    committee_id: key.committee_id,
                    zip: key.zip,
                    year: key.year,
                    percentile: stats.percentile_value,
                    total: stats.total,
                    count: stats.count,
                }))
            }
        }
    }

    pub fn donors(&self) -> &DonorHistory {
        &self.donors
    }

    pub fn groups(&self) -> &Groups {
        &self.groups
    }
}

/// Writer settings for output lines: `|` separated, no header, never quoted.
pub fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(b'|')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'));
    builder
}

fn stream<R, W>(
    input: csv::Reader<R>,
    writer: &mut csv::Writer<W>,
    analyzer: &mut DonationAnalyzer,
    summary: &mut RunSummary,
    percentile: u32,
    rules: &ValidationRules,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: std::io::Read,
    W: std::io::Write,
{
    for record in parse(input, rules) {
        summary.records_read += 1;
        let record = match record {
            Ok(record) => record,
            Err(error) if error.is_malformed_input() => {
                debug!(line = summary.records_read, %error, "skipping record");
                summary.records_skipped += 1;
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        if let Some(donation) = analyzer.process(&record, percentile)? {
            writer.serialize(&donation)?;
            summary.lines_written += 1;
        }
    }
    Ok(())
}

/// Stream contributions from `input` and write one line per repeat donation to `output`
/// as soon as it is produced. Malformed lines are skipped; anything else ends the run.
pub fn run(
    input: impl std::io::Read,
    output: impl std::io::Write,
    percentile: u32,
    rules: &ValidationRules,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let mut analyzer = DonationAnalyzer::default();
    let mut summary = RunSummary::default();
    let mut writer = writer_builder().from_writer(output);

    let outcome = stream(
        reader_builder().from_reader(input),
        &mut writer,
        &mut analyzer,
        &mut summary,
        percentile,
        rules,
    );
    // Lines produced before a fatal error stay written.
    writer.flush()?;
    outcome?;

    info!(
        records_read = summary.records_read,
        records_skipped = summary.records_skipped,
        lines_written = summary.lines_written,
        donors = analyzer.donors().len(),
        groups = analyzer.groups().len(),
        "finished analyzing contributions"
    );
    Ok(summary)
}
