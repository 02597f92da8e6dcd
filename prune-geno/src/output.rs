//! Tab-separated result writers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use prune_core::ld::PairwiseResult;
use prune_core::locus::{Locus, LocusState};
use prune_core::panel::Panel;
use prune_core::pruner::LdSink;

pub const RESULTS_HEADER: &str = "name\tchr\tpos\ta1\ta2\ttagged\tselected\tbest_tag\tr^2";

pub const LD_HEADER: &str = "index_snp_name\tindex_snp_chr\tindex_snp_pos\t\
    index_snp_a1\tindex_snp_a2\tpartner_snp_name\tpartner_snp_chr\tpartner_snp_pos\t\
    partner_snp_a1\tpartner_snp_a2\tr^2\tD'";

/// Writes `<out>.results`.
pub struct ResultsWriter;

impl ResultsWriter {
    /// One row per locus in priority order, skipping loci that failed the
    /// statistics filters unless they are force-included.
    pub fn write<P: AsRef<Path>>(
        path: P,
        panel: &Panel,
        order: &[usize],
        states: &[LocusState],
    ) -> Result<usize> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create results file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let rows = Self::write_to(&mut writer, panel, order, states)?;
        writer.flush()?;
        info!("Wrote {} rows to {}", rows, path.display());
        Ok(rows)
    }

    pub fn write_to(
        writer: &mut impl Write,
        panel: &Panel,
        order: &[usize],
        states: &[LocusState],
    ) -> Result<usize> {
        let loci = panel.loci();
        let genotypes = panel.genotypes();
        writeln!(writer, "{}", RESULTS_HEADER)?;

        let mut rows = 0;
        for &id in order {
            let locus = &loci[id];
            if !genotypes[id].is_valid() && !locus.force_include {
                continue;
            }
            let state = &states[id];
            let (best_tag, r2) = match state.best_tag() {
                Some(link) => (loci[link.tagger].name.as_str(), link.r2.to_string()),
                None => ("NA", "NA".to_string()),
            };
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                locus.name,
                locus.chrom,
                locus.pos,
                locus.allele1,
                locus.allele2,
                state.tagged as u8,
                state.picked as u8,
                best_tag,
                r2
            )?;
            rows += 1;
        }
        Ok(rows)
    }
}

/// Streams evaluated pairs to `<out>.ld` as the pruner produces them.
pub struct LdFileWriter {
    writer: BufWriter<File>,
    rows: usize,
}

impl LdFileWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create LD file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", LD_HEADER)?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush().context("Failed to flush LD file")?;
        Ok(self.rows)
    }
}

fn write_locus(writer: &mut impl Write, locus: &Locus) -> std::io::Result<()> {
    write!(
        writer,
        "{}\t{}\t{}\t{}\t{}",
        locus.name, locus.chrom, locus.pos, locus.allele1, locus.allele2
    )
}

impl LdSink for LdFileWriter {
    fn record(&mut self, panel: &Panel, pair: &PairwiseResult) -> prune_core::Result<()> {
        let loci = panel.loci();
        write_locus(&mut self.writer, &loci[pair.index])?;
        self.writer.write_all(b"\t")?;
        write_locus(&mut self.writer, &loci[pair.partner])?;
        writeln!(self.writer, "\t{}\t{}", pair.r2, pair.dprime)?;
        self.rows += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prune_core::chrom::Chromosome;
    use prune_core::genotype::{CompressedGenotypes, Genotype};
    use prune_core::locus::{LocusGenotypes, TagLink};
    use prune_core::sample::{Founder, Sex};

    fn panel() -> Panel {
        let chr1 = Chromosome::parse("1").unwrap();
        let founders: Vec<Founder> = (0..4)
            .map(|i| Founder::new("F", format!("I{}", i), Sex::Female))
            .collect();
        let poly = CompressedGenotypes::from_genotypes(&[
            Genotype::HomAllele1,
            Genotype::Het,
            Genotype::HomAllele2,
            Genotype::Het,
        ]);
        let mono = CompressedGenotypes::from_genotypes(&[Genotype::HomAllele1; 4]);
        let mut forced = Locus::new("rs3", chr1.clone(), 300, 0.5);
        forced.force_include = true;
        let loci = vec![
            Locus::new("rs1", chr1.clone(), 100, 0.01),
            Locus::new("rs2", chr1, 200, 0.02),
            forced,
        ];
        let genotypes = vec![
            LocusGenotypes::new(poly.clone(), "A", "B"),
            LocusGenotypes::new(mono.clone(), "A", "B"),
            LocusGenotypes::new(mono, "A", "B"),
        ];
        let mut panel = Panel::new(loci, genotypes, founders).unwrap();
        panel.compute_statistics(0.05, 0.1);
        panel
    }

    #[test]
    fn test_results_rows() {
        let panel = panel();
        let mut states = vec![LocusState::default(); 3];
        states[0].picked = true;
        states[0].tagged = true;
        states[0].tagged_by.push(TagLink { tagger: 0, r2: 1.0 });

        let mut out = Vec::new();
        let rows = ResultsWriter::write_to(&mut out, &panel, &[0, 1, 2], &states).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        // rs2 is monomorphic and not force-included.
        assert_eq!(rows, 2);
        assert_eq!(lines[0], RESULTS_HEADER);
        assert_eq!(lines[1], "rs1\t1\t100\tA\tB\t1\t1\trs1\t1");
        assert_eq!(lines[2], "rs3\t1\t300\tA\tB\t0\t0\tNA\tNA");
    }

    #[test]
    fn test_ld_file() {
        let panel = panel();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ld");

        let mut writer = LdFileWriter::create(&path).unwrap();
        let pair = PairwiseResult {
            index: 0,
            partner: 2,
            r2: 0.25,
            dprime: 0.5,
        };
        writer.record(&panel, &pair).unwrap();
        assert_eq!(writer.finish().unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], LD_HEADER);
        assert_eq!(lines[0].split('\t').count(), 12);
        assert_eq!(lines[1], "rs1\t1\t100\tA\tB\trs3\t1\t300\tA\tB\t0.25\t0.5");
    }
}
