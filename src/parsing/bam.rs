use std::path::Path;

use noodles::bam;

use crate::parsing::reader::ParseError;

/// Call `visit` with the decoded sequence of every alignment record of a BAM file.
///
/// Records without a stored sequence are skipped. Returns the number of records
/// visited.
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be opened and `ParseError::Noodles`
/// if the header or a record cannot be decoded.
pub fn for_each_sequence<F>(path: &Path, mut visit: F) -> Result<u64, ParseError>
where
    F: FnMut(&[u8]),
{
    let mut reader = std::fs::File::open(path)
        .map(bam::io::Reader::new)
        .map_err(|source| ParseError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    reader
        .read_header()
        .map_err(|e| ParseError::Noodles(e.to_string()))?;

    let mut sequence = Vec::new();
    let mut nb_records = 0u64;

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to read BAM record: {e}")))?;

        sequence.clear();
        sequence.extend(record.sequence().iter());
        if sequence.is_empty() {
            continue;
        }

        visit(&sequence);
        nb_records += 1;
    }

    Ok(nb_records)
}

/// Write an unmapped BAM file holding one record per sequence
#[cfg(test)]
pub(crate) fn write_unmapped_bam(path: &Path, sequences: &[&[u8]]) -> std::io::Result<()> {
    use noodles::sam::{self, alignment::io::Write as _, alignment::record_buf::Sequence};

    let header = sam::Header::default();
    let mut writer = std::fs::File::create(path).map(bam::io::Writer::new)?;
    writer.write_header(&header)?;

    for (i, bases) in sequences.iter().enumerate() {
        let record = sam::alignment::RecordBuf::builder()
            .set_name(format!("r{i}"))
            .set_sequence(Sequence::from(bases.to_vec()))
            .build();
        writer.write_alignment_record(&header, &record)?;
    }
    writer.try_finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_decoded_and_empty_records_skipped() {
        let temp = tempfile::NamedTempFile::with_suffix(".bam").unwrap();
        write_unmapped_bam(temp.path(), &[b"ACGTN", b"", b"GGA"]).unwrap();

        let mut seen = Vec::new();
        let n = for_each_sequence(temp.path(), |seq| seen.push(seq.to_vec())).unwrap();
        assert_eq!(n, 2);
        assert_eq!(seen, vec![b"ACGTN".to_vec(), b"GGA".to_vec()]);
    }

    #[test]
    fn test_missing_bam_is_open_error() {
        let err = for_each_sequence(Path::new("/nonexistent/aln.bam"), |_| {}).unwrap_err();
        assert!(matches!(err, ParseError::Open { .. }));
    }

    #[test]
    fn test_garbage_bam_is_rejected() {
        use std::io::Write;
        let mut temp = tempfile::NamedTempFile::with_suffix(".bam").unwrap();
        temp.write_all(b"this is not a bam file").unwrap();
        temp.flush().unwrap();

        assert!(for_each_sequence(temp.path(), |_| {}).is_err());
    }
}
