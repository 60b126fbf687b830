//! Les Houches event file reader.
//!
//! Plain and gzip-compressed files are accepted; compression is detected
//! from the first two bytes, not from the file name.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use lt_core::{Error, EventSource, RawEvent, RawParticle, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Pulls events one at a time from an LHE stream.
pub struct LheReader<R: BufRead> {
    inner: lhef::Reader<R>,
    origin: String,
    events: u64,
}

impl LheReader<Box<dyn BufRead>> {
    /// Open an LHE file, transparently decompressing gzip input.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::Input(format!("failed to open {}: {e}", path.display())))?;
        let mut buffered = BufReader::new(file);
        let gzipped = buffered.fill_buf()?.starts_with(&GZIP_MAGIC);
        let stream: Box<dyn BufRead> = if gzipped {
            tracing::debug!(path = %path.display(), "gzip-compressed input");
            Box::new(BufReader::new(MultiGzDecoder::new(buffered)))
        } else {
            Box::new(buffered)
        };
        Self::with_origin(stream, path.display().to_string())
    }
}

impl<R: BufRead> LheReader<R> {
    /// Read the LHE header and init block from `stream`.
    pub fn new(stream: R) -> Result<Self> {
        Self::with_origin(stream, "<stream>".into())
    }

    fn with_origin(stream: R, origin: String) -> Result<Self> {
        let inner = lhef::Reader::new(stream)
            .map_err(|e| Error::Input(format!("{origin}: not a Les Houches event file: {e}")))?;
        Ok(Self { inner, origin, events: 0 })
    }

    /// Events delivered so far.
    pub fn events_read(&self) -> u64 {
        self.events
    }

    /// Path (or `<stream>`) the events come from.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl<R: BufRead> EventSource for LheReader<R> {
    fn next_event(&mut self) -> Result<Option<RawEvent>> {
        let next = self.inner.hepeup().map_err(|e| {
            Error::Input(format!("{}: malformed event after #{}: {e}", self.origin, self.events))
        })?;
        let Some(hepeup) = next else {
            return Ok(None);
        };
        self.events += 1;
        raw_event(&hepeup).map(Some).map_err(|e| match e {
            Error::Input(msg) => Error::Input(format!("{}: event #{}: {msg}", self.origin, self.events)),
            other => other,
        })
    }
}

/// Flatten one generator event record into a [`RawEvent`].
pub fn raw_event(hepeup: &lhef::HEPEUP) -> Result<RawEvent> {
    let n = hepeup.IDUP.len();
    let columns = [
        hepeup.ISTUP.len(),
        hepeup.MOTHUP.len(),
        hepeup.ICOLUP.len(),
        hepeup.PUP.len(),
        hepeup.VTIMUP.len(),
        hepeup.SPINUP.len(),
    ];
    if columns.iter().any(|&len| len != n) {
        return Err(Error::Input(format!("inconsistent particle columns ({n} codes, {columns:?})")));
    }
    if usize::try_from(hepeup.NUP).ok() != Some(n) {
        tracing::warn!(declared = hepeup.NUP, found = n, "particle count differs from event header");
    }

    let particles = (0..n)
        .map(|i| {
            let [px, py, pz, energy, mass] = hepeup.PUP[i];
            RawParticle {
                pdg_id: hepeup.IDUP[i],
                status: hepeup.ISTUP[i],
                px,
                py,
                pz,
                energy,
                mass,
                mother1: hepeup.MOTHUP[i][0],
                mother2: hepeup.MOTHUP[i][1],
                color1: hepeup.ICOLUP[i][0],
                color2: hepeup.ICOLUP[i][1],
                lifetime: hepeup.VTIMUP[i],
                spin: hepeup.SPINUP[i],
            }
        })
        .collect();

    Ok(RawEvent { particles, weight: hepeup.XWGTUP, process_id: hepeup.IDRUP })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_EVENTS: &str = "\
<LesHouchesEvents version=\"3.0\">
<init>
2212 2212 6.500000e+03 6.500000e+03 0 0 247000 247000 -4 1
5.0e+02 1.0e+00 5.0e+02 1
</init>
<event>
 3 1 +2.5e+00 1.7e+02 7.5e-03 1.1e-01
       21 -1    0    0  501  502 +0.0e+00 +0.0e+00 +4.0e+02 4.0e+02 0.0e+00 0.0e+00 9.0e+00
        6  2    1    0  501    0 +1.0e+01 +0.0e+00 +3.0e+02 3.5e+02 1.7e+02 0.0e+00 -1.0e+00
       11  1    2    2    0    0 +3.0e+00 +4.0e+00 +0.0e+00 5.0e+00 0.0e+00 0.0e+00 1.0e+00
</event>
<event>
 1 2 -1.0e+00 9.1e+01 7.5e-03 1.1e-01
       22  1    0    0    0    0 +1.0e+00 +0.0e+00 +0.0e+00 1.0e+00 0.0e+00 0.0e+00 0.0e+00
</event>
</LesHouchesEvents>
";

    #[test]
    fn test_reads_events_in_order() {
        let mut reader = LheReader::new(TWO_EVENTS.as_bytes()).unwrap();
        let first = reader.next_event().unwrap().unwrap();
        assert_eq!(first.particles.len(), 3);
        assert_eq!(first.weight, 2.5);
        assert_eq!(first.process_id, 1);

        let e = first.particles[2];
        assert_eq!((e.pdg_id, e.status, e.mother1, e.mother2), (11, 1, 2, 2));
        assert_eq!((e.px, e.py, e.energy), (3.0, 4.0, 5.0));
        assert_eq!(e.spin, 1.0);
        assert_eq!(first.particles[1].mass, 170.0);
        assert_eq!(first.particles[0].color2, 502);

        let second = reader.next_event().unwrap().unwrap();
        assert_eq!(second.weight, -1.0);
        assert_eq!(second.particles[0].pdg_id, 22);
        assert!(reader.next_event().unwrap().is_none());
        assert_eq!(reader.events_read(), 2);
    }

    #[test]
    fn test_rejects_non_lhe_input() {
        assert!(matches!(LheReader::new("hello world\n".as_bytes()), Err(Error::Input(_))));
    }

    #[test]
    fn test_inconsistent_columns() {
        let hepeup = lhef::HEPEUP {
            NUP: 1,
            IDRUP: 1,
            XWGTUP: 1.0,
            SCALUP: 91.0,
            AQEDUP: 0.0078,
            AQCDUP: 0.118,
            IDUP: vec![11],
            ISTUP: vec![1],
            MOTHUP: vec![],
            ICOLUP: vec![[0, 0]],
            PUP: vec![[0.0; 5]],
            VTIMUP: vec![0.0],
            SPINUP: vec![9.0],
            info: String::new(),
            attr: Default::default(),
        };
        assert!(matches!(raw_event(&hepeup), Err(Error::Input(_))));
    }
}
