//! LHE file → converter → Parquet table → reader.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use approx::assert_relative_eq;
use flate2::Compression;
use flate2::write::GzEncoder;
use lt_core::{Error, RecordSink};
use lt_event::{Converter, ConverterConfig, ParticleView, SpeciesCatalog};
use lt_io::{LheReader, ParquetSink, ParquetTableReader};

const TTBAR: &str = "\
<LesHouchesEvents version=\"3.0\">
<init>
2212 2212 6.500000e+03 6.500000e+03 0 0 247000 247000 -4 1
5.0e+02 1.0e+00 5.0e+02 1
</init>
<event>
 8 1 +1.0e+00 1.7e+02 7.5e-03 1.1e-01
       21 -1    0    0  501  502 +0.0e+00 +0.0e+00 +7.0e+02 7.0e+02 0.0e+00 0.0e+00 9.0e+00
       21 -1    0    0  502  503 +0.0e+00 +0.0e+00 -3.0e+02 3.0e+02 0.0e+00 0.0e+00 9.0e+00
        6  2    1    2  501    0 +6.0e+01 +0.0e+00 +4.0e+02 4.5e+02 1.7e+02 0.0e+00 0.0e+00
       -6  2    1    2    0  503 -6.0e+01 +0.0e+00 +0.0e+00 5.5e+02 1.7e+02 0.0e+00 0.0e+00
        5  1    3    3  501    0 +2.0e+01 +1.0e+01 +5.0e+00 3.0e+01 4.7e+00 0.0e+00 -1.0e+00
       24  2    3    3    0    0 +4.0e+01 -1.0e+01 +1.0e+02 1.2e+02 8.0e+01 0.0e+00 0.0e+00
      -11  1    6    6    0    0 +3.0e+00 +4.0e+00 +0.0e+00 5.0e+00 0.0e+00 0.0e+00 1.0e+00
       12  1    6    6    0    0 +3.7e+01 -1.4e+01 +1.0e+02 1.1e+02 0.0e+00 0.0e+00 -1.0e+00
</event>
<event>
 2 1 +1.0e+00 1.7e+02 7.5e-03 1.1e-01
     9999  1    0    0    0    0 +1.0e+00 +0.0e+00 +0.0e+00 1.0e+00 0.0e+00 0.0e+00 0.0e+00
       22  3    0    0    0    0 +1.0e+00 +0.0e+00 +0.0e+00 1.0e+00 0.0e+00 0.0e+00 0.0e+00
</event>
</LesHouchesEvents>
";

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let dir = std::env::temp_dir().join(format!("lhetab_{name}_{}_{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn convert(input: &Path, output: &Path) -> lt_event::ConversionSummary {
    let catalog = SpeciesCatalog::with_defaults();
    let mut reader = LheReader::open(input).unwrap();
    let sink = ParquetSink::create(output).unwrap();
    let mut conv = Converter::new(&catalog, ConverterConfig::default(), sink).unwrap();
    conv.run(&mut reader, None).unwrap();
    conv.finish().unwrap().0
}

#[test]
fn plain_lhe_to_parquet() {
    let dir = tmp_dir("plain");
    let input = dir.join("ttbar.lhe");
    std::fs::write(&input, TTBAR).unwrap();
    let output = dir.join("ttbar.parquet");

    let summary = convert(&input, &output);
    assert_eq!(summary.events_read, 2);
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.particles.unknown_type, 1);
    assert_eq!(summary.particles.status_rejected, 1);

    let table = ParquetTableReader::open(&output).unwrap();
    assert_eq!(table.num_rows(), 2);
    let schema = table.schema().clone();
    assert_eq!(schema.species.len(), SpeciesCatalog::with_defaults().len());

    let rows = table.read_rows().unwrap();
    let first = &rows[0];
    assert_eq!(first.particles(&schema, "Gluon").len(), 2);
    assert_eq!(first.particles(&schema, "Gluon")[0].pz, 700.0);

    let tops = first.particles(&schema, "Top");
    assert_eq!(tops.len(), 2);
    assert!(tops[0].pt >= tops[1].pt);
    assert!(tops.iter().all(|t| t.descends_from(21)));

    let b = first.particles(&schema, "Bottom")[0];
    assert_eq!((b.pdg_id_mother1, b.pdg_id_mother2), (6, 6));
    assert_eq!(b.helicity, -1);
    assert_relative_eq!(b.charge, -1.0 / 3.0);

    let positron = first.particles(&schema, "Electron")[0];
    assert_eq!(positron.pdg_id, -11);
    assert_relative_eq!(positron.pt, 5.0);
    assert_eq!(positron.eta, 0.0);
    assert_eq!(positron.charge, 1.0);
    assert_eq!(positron.pdg_id_mother1, 24);

    assert_eq!(rows[1].n_particles(), 0);
    assert_eq!(table.read_species("Gamma").unwrap(), vec![vec![], vec![]]);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn gzip_input_matches_plain() {
    let dir = tmp_dir("gzip");
    let plain = dir.join("ttbar.lhe");
    std::fs::write(&plain, TTBAR).unwrap();
    let gz = dir.join("ttbar.lhe.gz");
    let mut enc = GzEncoder::new(std::fs::File::create(&gz).unwrap(), Compression::default());
    enc.write_all(TTBAR.as_bytes()).unwrap();
    enc.finish().unwrap();

    convert(&plain, &dir.join("a.parquet"));
    convert(&gz, &dir.join("b.parquet"));
    let a = ParquetTableReader::open(&dir.join("a.parquet")).unwrap().read_rows().unwrap();
    let b = ParquetTableReader::open(&dir.join("b.parquet")).unwrap().read_rows().unwrap();
    assert_eq!(a, b);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn truncated_input_leaves_unreadable_table() {
    let dir = tmp_dir("truncated");
    let input = dir.join("cut.lhe");
    let cut = TTBAR.find("       21 -1    0    0  502").unwrap();
    std::fs::write(&input, &TTBAR[..cut + 20]).unwrap();
    let output = dir.join("cut.parquet");

    let catalog = SpeciesCatalog::with_defaults();
    let mut reader = LheReader::open(&input).unwrap();
    let mut sink = ParquetSink::create(&output).unwrap();
    let err = {
        let mut conv = Converter::new(&catalog, ConverterConfig::default(), &mut sink).unwrap();
        conv.run(&mut reader, None).unwrap_err()
    };
    assert!(matches!(err, Error::Input(_)));
    drop(sink);
    assert!(ParquetTableReader::open(&output).is_err());

    let missing = LheReader::open(&dir.join("nope.lhe"));
    assert!(matches!(missing, Err(Error::Input(_))));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn sink_can_be_driven_directly() {
    let dir = tmp_dir("direct");
    let output = dir.join("direct.parquet");
    let mut sink = ParquetSink::create(&output).unwrap();
    let schema = lt_core::TableSchema::new(vec!["Top".into()], 2).unwrap();
    sink.declare(&schema).unwrap();
    sink.finalize().unwrap();
    let table = ParquetTableReader::open(&output).unwrap();
    assert_eq!(table.num_rows(), 0);
    assert!(table.read_rows().unwrap().is_empty());
    std::fs::remove_dir_all(&dir).ok();
}
