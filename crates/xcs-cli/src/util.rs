use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use xcs_core::XcsConfig;

/// JSON destination: a file if a path was given, stdout otherwise.
#[derive(Debug)]
pub enum Output {
    Stdout,
    File { path: PathBuf },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let output = output_path.map_or(Output::Stdout, |path| Output::File { path });
        match &output {
            Output::Stdout => output.write_json(io::stdout().lock(), value),
            Output::File { path } => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file: {output}"))?;
                output.write_json(BufWriter::new(file), value)
            }
        }
    }

    fn write_json<W, T>(&self, mut writer: W, value: &T) -> anyhow::Result<()>
    where
        W: Write,
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut writer, value)
            .with_context(|| format!("Failed to write JSON to {self}"))?;
        writeln!(writer).with_context(|| format!("Failed to write newline to {self}"))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush output to {self}"))
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Stdout => f.write_str("stdout"),
            Output::File { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Reads learning parameters from a JSON file.
///
/// Parameters missing from the file keep their default values.
pub fn read_config_file<P>(path: P) -> anyhow::Result<XcsConfig>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open configuration file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| {
        format!(
            "Failed to parse configuration JSON file: {}",
            path.display()
        )
    })
}
