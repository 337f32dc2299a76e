use regex::Regex;
use thiserror::Error;

/// Preset barcode formats for common read header styles.
#[derive(clap::ValueEnum, Clone)]
pub enum PresetBarcodeFormats {
    /// `UMI:<barcode>` marker anywhere in the header, as written by the
    /// barcoded-read preprocessing tools.
    Umi,

    /// `_<barcode>` at the end of the header, as produced by `umi-tools extract`.
    UnderscoreTail,

    /// `:<barcode>` at the end of the header, as produced by bcl2fastq.
    ColonTail,
}

/// Returns the regular expression string for a barcode preset. The barcode is
/// the first capture group.
pub fn get_barcode_regex(preset: &PresetBarcodeFormats) -> String {
    match preset {
        PresetBarcodeFormats::Umi => String::from(r"UMI:([ACGTN]+)"),
        PresetBarcodeFormats::UnderscoreTail => String::from(r"_([ACGT]+)$"),
        PresetBarcodeFormats::ColonTail => String::from(r":([ACGT]+)$"),
    }
}

#[derive(Error, Debug)]
pub enum BarcodeErr {
    #[error(
        "no barcode produced for read
    `{id}`
with capture group
    {re:?}
suggestion: pass --barcode-regex with a pattern matching your header format"
    )]
    NoMatch { id: String, re: Regex },
}

/// Derives a grouping barcode from a read identifier. Any deterministic
/// extraction works for grouping; this one takes the first capture group of a
/// regex (or the whole match, for patterns without groups).
pub struct BarcodeExtractor {
    re: Regex,
}

impl BarcodeExtractor {
    pub fn new(pattern: &str) -> anyhow::Result<Self> {
        Ok(BarcodeExtractor {
            re: Regex::new(pattern)?,
        })
    }

    pub fn extract(&self, id: &str) -> Result<String, BarcodeErr> {
        let captures = self.re.captures(id).ok_or_else(|| BarcodeErr::NoMatch {
            id: id.to_string(),
            re: self.re.clone(),
        })?;

        let matched = match captures.get(1) {
            Some(group) => group.as_str(),
            None => &captures[0],
        };

        Ok(matched.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn umi_preset_extracts_marker() {
        let extractor =
            BarcodeExtractor::new(&get_barcode_regex(&PresetBarcodeFormats::Umi)).unwrap();
        assert_eq!(
            extractor.extract("read_1_UMI:ACGTACGT").unwrap(),
            "ACGTACGT"
        );
    }

    #[test]
    fn tail_presets_anchor_to_end() {
        let extractor =
            BarcodeExtractor::new(&get_barcode_regex(&PresetBarcodeFormats::UnderscoreTail))
                .unwrap();
        assert_eq!(extractor.extract("read_1_AATT").unwrap(), "AATT");

        let extractor =
            BarcodeExtractor::new(&get_barcode_regex(&PresetBarcodeFormats::ColonTail)).unwrap();
        assert_eq!(extractor.extract("machine:17:GGCC").unwrap(), "GGCC");
    }

    #[test]
    fn non_matching_header_is_an_error() {
        let extractor =
            BarcodeExtractor::new(&get_barcode_regex(&PresetBarcodeFormats::Umi)).unwrap();
        let err = extractor.extract("read_without_barcode").unwrap_err();
        assert!(err.to_string().contains("read_without_barcode"));
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = BarcodeExtractor::new(r"UMI:([ACGTN]+)").unwrap();
        let a = extractor.extract("r_UMI:ACGT").unwrap();
        let b = extractor.extract("r_UMI:ACGT").unwrap();
        assert_eq!(a, b);
    }
}
