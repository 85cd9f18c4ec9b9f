use std::{
    ffi::OsStr,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::info;
use walkdir::WalkDir;

use crate::config::TranslatorConfig;
use crate::error::DriverError;
use crate::parser;
use crate::translator::Translator;

const SOURCE_EXT: &str = "vm";
const OUTPUT_EXT: &str = "asm";

/// What one run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub output: PathBuf,
    pub sources: Vec<PathBuf>,
    pub commands: usize,
}

/// Unit name used to qualify statics: the file name without `.vm`.
pub fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lists the `.vm` files for `input`: the file itself, or every `.vm` file
/// directly inside the directory, sorted by name.
pub fn collect_sources(input: &Path) -> Result<Vec<PathBuf>, DriverError> {
    let meta = fs::metadata(input).map_err(|source| DriverError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        if input.extension() != Some(OsStr::new(SOURCE_EXT)) {
            return Err(DriverError::NotVmSource(input.to_path_buf()));
        }
        return Ok(vec![input.to_path_buf()]);
    }

    let mut sources = vec![];
    for entry in WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| DriverError::Walk {
            path: input.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new(SOURCE_EXT)) {
            sources.push(entry.into_path());
        }
    }

    if sources.is_empty() {
        return Err(DriverError::NoSourceFiles(input.to_path_buf()));
    }
    Ok(sources)
}

/// `Foo.vm` -> `Foo.asm`; `dir/` -> `dir/dir.asm`.
pub fn default_output(input: &Path) -> Result<PathBuf, DriverError> {
    if !input.is_dir() {
        return Ok(input.with_extension(OUTPUT_EXT));
    }

    let full = input.canonicalize().map_err(|source| DriverError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let name = unit_name(&full);
    Ok(input.join(format!("{}.{}", name, OUTPUT_EXT)))
}

/// True when `output` already exists and is the same file as one of `sources`.
fn overwrites_source(output: &Path, sources: &[PathBuf]) -> bool {
    let Ok(output) = output.canonicalize() else {
        return false;
    };
    sources
        .iter()
        .filter_map(|source| source.canonicalize().ok())
        .any(|source| source == output)
}

fn translate_sources<W: Write>(
    translator: &mut Translator<W>,
    sources: &[PathBuf],
) -> Result<usize, DriverError> {
    let mut commands = 0;

    for path in sources {
        let text = fs::read_to_string(path).map_err(|source| DriverError::Read {
            path: path.clone(),
            source,
        })?;
        let program = parser::parse(&text).map_err(|source| DriverError::Parse {
            path: path.clone(),
            source,
        })?;

        info!(file = %path.display(), commands = program.len(), "translating");
        translator.set_source_unit(unit_name(path));
        translator
            .translate(&program)
            .map_err(|source| DriverError::Translate {
                path: path.clone(),
                source,
            })?;
        commands += program.len();
    }

    Ok(commands)
}

/// Translates `input` (a file or directory) into a single `.asm` file.
///
/// One translator serves every source, so comparison labels stay unique
/// across the merged output. The output is closed whether or not
/// translation succeeds.
pub fn translate_path(
    input: &Path,
    output: Option<&Path>,
    config: TranslatorConfig,
) -> Result<Summary, DriverError> {
    let sources = collect_sources(input)?;
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output(input)?,
    };
    if overwrites_source(&output, &sources) {
        return Err(DriverError::OutputIsSource(output));
    }

    let file = File::create(&output).map_err(|source| DriverError::Create {
        path: output.clone(),
        source,
    })?;
    let mut translator = Translator::new(BufWriter::new(file), config);

    let result = translate_sources(&mut translator, &sources);
    let closed = translator
        .close()
        .map_err(|source| DriverError::Translate {
            path: output.clone(),
            source,
        });
    let commands = result?;
    closed?;

    info!(output = %output.display(), files = sources.len(), commands, "done");
    Ok(Summary {
        output,
        sources,
        commands,
    })
}
