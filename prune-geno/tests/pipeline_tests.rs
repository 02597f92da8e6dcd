//! Read, prune and write a small transposed-PLINK dataset end to end.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use prune_core::config::PruneConfig;
use prune_core::panel::Panel;
use prune_core::pruner::Pruner;
use prune_core::sample::{apply_filter, kept_founders, SampleFilter};
use prune_core::threshold::Metric;
use prune_geno::output::{LdFileWriter, ResultsWriter, RESULTS_HEADER};
use prune_geno::sample_list::read_sample_list;
use prune_geno::snp_table::SnpTable;
use prune_geno::tfam::read_tfam;
use prune_geno::tped::read_tped;

const ALLELES: [&str; 8] = ["A A", "A G", "G G", "A A", "A G", "A A", "G G", "A G"];

fn write_lines(path: &Path, lines: &[String]) {
    let mut f = File::create(path).unwrap();
    for line in lines {
        writeln!(f, "{}", line).unwrap();
    }
}

/// Eight founders; rs1, rs2 and rs3 share genotypes, rs4 is monomorphic
/// and rs5 sits on chromosome 2.
fn write_dataset(dir: &Path) {
    let tfam: Vec<String> = (0..ALLELES.len())
        .map(|i| format!("FAM{} IND{} 0 0 {} -9", i, i, 1 + i % 2))
        .collect();
    write_lines(&dir.join("data.tfam"), &tfam);

    let shared = ALLELES.join(" ");
    let flipped = shared.replace('A', "x").replace('G', "A").replace('x', "G");
    let mono = vec!["C C"; ALLELES.len()].join(" ");
    let tped = vec![
        format!("1 rs2 0 2000 {}", shared),
        format!("1 rs1 0 1000 {}", shared),
        format!("1 rs3 0 3000 {}", flipped),
        format!("1 rs4 0 4000 {}", mono),
        format!("2 rs5 0 1000 {}", shared),
        format!("1 rs99 0 9000 {}", shared),
    ];
    write_lines(&dir.join("data.tped"), &tped);

    write_lines(
        &dir.join("snps.txt"),
        &[
            "name chr pos a1 a2 p forceSelect designScore quality".to_string(),
            "rs1 1 1000 A G 1e-8 0 1 0.2".to_string(),
            "rs2 1 2000 A G 1e-3 0 1 0.9".to_string(),
            "rs3 1 3000 G A 0.2 0 1 0.5".to_string(),
            "rs4 1 4000 C T 0.01 0 1 0.5".to_string(),
            "rs5 2 1000 A G 0.5 0 1 0.5".to_string(),
        ],
    );
}

struct Run {
    panel: Panel,
    order: Vec<usize>,
    states: Vec<prune_core::locus::LocusState>,
}

fn prune(dir: &Path, config: &PruneConfig, filter: &SampleFilter, ld: bool) -> Run {
    let individuals = read_tfam(dir.join("data.tfam")).unwrap();
    let mask = apply_filter(&individuals, filter).unwrap();
    let chromosome = config.chromosome.as_ref();
    let table = SnpTable::read(dir.join("snps.txt"), &config.metrics, chromosome).unwrap();
    let genotypes = read_tped(dir.join("data.tped"), &mask, &table, chromosome).unwrap();
    let founders = kept_founders(&individuals, &mask);
    let mut panel = Panel::new(table.into_loci(), genotypes, founders).unwrap();
    panel.compute_statistics(config.min_maf, config.min_call_rate);

    let mut pruner = Pruner::new(&panel, config);
    if ld {
        let mut writer = LdFileWriter::create(dir.join("out.ld")).unwrap();
        pruner.run(&mut writer).unwrap();
        writer.finish().unwrap();
    } else {
        pruner.run(&mut prune_core::pruner::NoLdOutput).unwrap();
    }
    let order = pruner.order().to_vec();
    let states = pruner.states().to_vec();
    Run { panel, order, states }
}

fn row<'a>(text: &'a str, name: &str) -> Option<Vec<&'a str>> {
    text.lines()
        .map(|l| l.split('\t').collect::<Vec<_>>())
        .find(|fields| fields[0] == name)
}

#[test]
fn test_pipeline_writes_results_and_ld() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let mut config = PruneConfig::default();
    config.min_maf = 0.05;
    config.r2_thresholds.add(1.0, 0.8);
    config.surrogate_thresholds.add(1e-6, 1);
    config.metrics.push(Metric::new("quality", 1.0));
    config.validate().unwrap();

    let run = prune(dir.path(), &config, &SampleFilter::All, true);
    let results_path = dir.path().join("out.results");
    let rows = ResultsWriter::write(&results_path, &run.panel, &run.order, &run.states).unwrap();
    let results = std::fs::read_to_string(&results_path).unwrap();

    // rs4 fails the MAF filter and is not reported.
    assert_eq!(rows, 4);
    assert_eq!(results.lines().next(), Some(RESULTS_HEADER));
    assert!(row(&results, "rs4").is_none());

    let rs1 = row(&results, "rs1").unwrap();
    assert_eq!(&rs1[..7], &["rs1", "1", "1000", "A", "G", "1", "1"]);
    assert_eq!(rs1[7], "rs1");
    assert_eq!(rs1[8], "1");

    // rs2 is the best surrogate by quality.
    let rs2 = row(&results, "rs2").unwrap();
    assert_eq!(rs2[6], "1");
    let rs3 = row(&results, "rs3").unwrap();
    assert_eq!(&rs3[5..8], &["1", "0", "rs1"]);
    assert_eq!(&rs3[3..5], &["G", "A"]);

    let rs5 = row(&results, "rs5").unwrap();
    assert_eq!(rs5[6], "1");

    // Priority order: chromosome, then p-value.
    let names: Vec<&str> = results.lines().skip(1).map(|l| l.split('\t').next().unwrap()).collect();
    assert_eq!(names, vec!["rs1", "rs2", "rs3", "rs5"]);

    let ld = std::fs::read_to_string(dir.path().join("out.ld")).unwrap();
    let ld_rows: Vec<Vec<&str>> = ld.lines().skip(1).map(|l| l.split('\t').collect()).collect();
    // rs1 against rs1, rs2, rs3; rs5 against itself.
    assert_eq!(ld_rows.len(), 4);
    assert!(ld_rows.iter().all(|r| r.len() == 12));
    assert!(ld_rows.iter().any(|r| r[0] == "rs1" && r[5] == "rs3"));
}

#[test]
fn test_pipeline_with_keep_list_and_chromosome() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    write_lines(
        &dir.path().join("keep.txt"),
        &(0..6).map(|i| format!("FAM{} IND{}", i, i)).collect::<Vec<_>>(),
    );

    let mut config = PruneConfig::default();
    config.r2_thresholds.add(1.0, 0.8);
    config.chromosome = Some(prune_core::chrom::Chromosome::parse("1").unwrap());
    let keep = read_sample_list(dir.path().join("keep.txt")).unwrap();

    let run = prune(dir.path(), &config, &SampleFilter::Keep(keep), false);
    assert_eq!(run.panel.founders().len(), 6);
    assert_eq!(run.panel.len(), 4);
    assert!(run.panel.loci().iter().all(|l| l.chrom.as_str() == "1"));

    let mut out = Vec::new();
    ResultsWriter::write_to(&mut out, &run.panel, &run.order, &run.states).unwrap();
    let results = String::from_utf8(out).unwrap();
    // With no MAF filter the monomorphic rs4 is reported as its own index SNP.
    let rs4 = row(&results, "rs4").unwrap();
    assert_eq!(&rs4[5..9], &["1", "1", "rs4", "1"]);
}

#[test]
fn test_missing_genotypes_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let mut f = std::fs::OpenOptions::new()
        .append(true)
        .open(dir.path().join("snps.txt"))
        .unwrap();
    writeln!(f, "rs6 1 6000 A G 0.1 0 1 0.5").unwrap();
    drop(f);

    let individuals = read_tfam(dir.path().join("data.tfam")).unwrap();
    let table = SnpTable::read(dir.path().join("snps.txt"), &[], None).unwrap();
    let err = read_tped(dir.path().join("data.tped"), &vec![true; individuals.len()], &table, None)
        .unwrap_err();
    assert!(err.to_string().contains("rs6"));
}
