use anyhow::{Context, Result};
use mpn_core::tokenizer::clean_control_chars;
use mpn_core::{DocumentRef, MatchVerdict, PartRecord};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Load part records from a JSON/JSONL file, or from every such file under a directory.
pub fn load_parts(input: &str) -> Result<Vec<PartRecord>> {
    let input_path = Path::new(input);
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        anyhow::bail!("parts input {} does not exist", input);
    }

    let mut parts = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            parts.extend(parts_jsonl(&file)?);
        } else {
            parts.extend(parts_json(&file)?);
        }
    }
    Ok(parts)
}

fn parts_jsonl(file: &Path) -> Result<Vec<PartRecord>> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let mut parts = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let record: PartRecord =
            serde_json::from_str(&line).with_context(|| format!("{}:{}", file.display(), n + 1))?;
        parts.push(record);
    }
    Ok(parts)
}

fn parts_json(file: &Path) -> Result<Vec<PartRecord>> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: serde_json::Value = serde_json::from_reader(reader).with_context(|| format!("parsing {}", file.display()))?;
    let parts = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .enumerate()
            .map(|(i, v)| serde_json::from_value(v).with_context(|| format!("{} record {}", file.display(), i + 1)))
            .collect::<Result<Vec<PartRecord>>>()?,
        serde_json::Value::Object(_) => {
            vec![serde_json::from_value(json).with_context(|| format!("parsing {}", file.display()))?]
        }
        _ => anyhow::bail!("{} holds neither an array nor an object", file.display()),
    };
    Ok(parts)
}

/// One reference per line; blank lines and `#` comments are skipped.
pub fn load_documents(path: &str) -> Result<Vec<DocumentRef>> {
    let reader = BufReader::new(File::open(path).with_context(|| format!("opening {path}"))?);
    let mut refs = Vec::new();
    for line in reader.lines() {
        let s = line?.trim().to_string();
        if s.is_empty() || s.starts_with('#') { continue; }
        refs.push(DocumentRef::from(s));
    }
    Ok(refs)
}

#[derive(Serialize)]
struct OutRow<'a> {
    #[serde(flatten)]
    verdict: &'a MatchVerdict,
    label: &'static str,
}

/// Write verdicts as JSONL with control characters stripped from every value.
pub fn write_verdicts(output: &str, verdicts: &[MatchVerdict]) -> Result<()> {
    if let Some(dir) = Path::new(output).parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut out = BufWriter::new(File::create(output).with_context(|| format!("creating {output}"))?);
    for verdict in verdicts {
        let cleaned = verdict.map_strings(clean_control_chars);
        let row = OutRow { verdict: &cleaned, label: cleaned.status().label() };
        serde_json::to_writer(&mut out, &row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
