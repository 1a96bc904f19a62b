#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("decor_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use decor_engine::detection::{AnalysisResponse, AnnotationBatch, Detection, parse_detections};
    use decor_engine::export::{write_mtl, write_obj, write_spec_json};
    use decor_engine::{Catalog, ModelGenerator, ModelSpec, Synthesizer};
    use log::LevelFilter;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::{Path, PathBuf};

    const USAGE: &str = r#"decor_cli (decor-engine)

USAGE:
  decor_cli [--verbose] archetypes
  decor_cli [--verbose] spec <detections.json> [options]
  decor_cli [--verbose] analyze <annotations.json> [options]
  decor_cli [--verbose] build <spec.json> [options]

COMMANDS:
  archetypes         List archetype ids with material, base color and palette
  spec               Map a JSON array of {name, score} to a model spec
  analyze            Map a classifier payload ({objects, labels}) to {objects, modelData}
  build              Synthesize a spec and report mesh diagnostics

OPTIONS (spec, analyze):
  --seed <n>         Seed the color pick for reproducible output
  --out <path>       Write JSON here instead of stdout

OPTIONS (build):
  --obj <path>       Write Wavefront OBJ
  --mtl <path>       Write the material library (referenced from the OBJ)

OPTIONS (all):
  --overwrite        Overwrite existing output files
  -v, --verbose      Log resolution decisions to stderr
  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        let mut raw: Vec<String> = std::env::args().skip(1).collect();
        let verbose = take_flag(&mut raw, &["-v", "--verbose"]);
        init_logger(verbose);
        let mut args = Args::new(raw);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "archetypes" => {
                print_archetypes();
                Ok(())
            }
            "spec" => cmd_spec(&mut args),
            "analyze" => cmd_analyze(&mut args),
            "build" => cmd_build(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_archetypes() {
        let catalog = Catalog::shared();
        for kind in catalog.kinds() {
            let template = catalog.template_or_default(kind);
            let palette = catalog
                .palette(kind.id())
                .map(|colors| colors.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<9} {:<9} {}  palette: {}",
                kind.id(),
                template.material,
                template.base_color,
                palette
            );
        }
    }

    /// Options shared by the JSON-producing commands.
    struct JsonOutput {
        seed: Option<u64>,
        out: Option<PathBuf>,
        overwrite: bool,
    }

    fn parse_json_options(args: &mut Args) -> Result<Option<JsonOutput>, String> {
        let mut output = JsonOutput {
            seed: None,
            out: None,
            overwrite: false,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let raw = args.value("--seed")?;
                    let seed = raw.parse().map_err(|e| format!("invalid --seed `{raw}`: {e}"))?;
                    output.seed = Some(seed);
                }
                "--out" => output.out = Some(PathBuf::from(args.value("--out")?)),
                "--overwrite" => output.overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(None);
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }
        Ok(Some(output))
    }

    fn cmd_spec(args: &mut Args) -> Result<(), String> {
        let input = PathBuf::from(args.next().ok_or("missing detections file")?);
        let Some(options) = parse_json_options(args)? else {
            return Ok(());
        };

        let text = read_text(&input)?;
        let detections = parse_detections(&text).map_err(|e| format!("parse {}: {e}", input.display()))?;
        let spec = generate(&detections, options.seed);

        emit(options.out.as_deref(), options.overwrite, |w| {
            write_spec_json(w, &spec).map_err(|e| e.to_string())
        })?;
        eprintln!("{}: {} from {} detections", spec.geometry_kind, spec.color, detections.len());
        Ok(())
    }

    fn cmd_analyze(args: &mut Args) -> Result<(), String> {
        let input = PathBuf::from(args.next().ok_or("missing annotations file")?);
        let Some(options) = parse_json_options(args)? else {
            return Ok(());
        };

        let text = read_text(&input)?;
        let batch: AnnotationBatch =
            serde_json::from_str(&text).map_err(|e| format!("parse {}: {e}", input.display()))?;
        let objects = batch.detections();
        let model_data = generate(&objects, options.seed);
        let response = AnalysisResponse { objects, model_data };

        emit(options.out.as_deref(), options.overwrite, |w| {
            serde_json::to_writer_pretty(&mut *w, &response).map_err(|e| format!("write json: {e}"))?;
            writeln!(w).map_err(|e| format!("write json: {e}"))
        })
    }

    fn cmd_build(args: &mut Args) -> Result<(), String> {
        let input = PathBuf::from(args.next().ok_or("missing spec file")?);

        let mut obj_path: Option<PathBuf> = None;
        let mut mtl_path: Option<PathBuf> = None;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--mtl" => mtl_path = Some(PathBuf::from(args.value("--mtl")?)),
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let text = read_text(&input)?;
        let spec = ModelSpec::from_json(&text).map_err(|e| format!("parse {}: {e}", input.display()))?;
        let model = Synthesizer::default().build_mesh(&spec);

        if let Some(path) = mtl_path.as_deref() {
            let file = create_file(path, overwrite)?;
            let mut w = BufWriter::new(file);
            write_mtl(&mut w, &model).map_err(|e| format!("write mtl: {e}"))?;
            eprintln!("wrote {}", path.display());
        }

        if let Some(path) = obj_path.as_deref() {
            // Reference the MTL relative to the OBJ when both are written.
            let mtllib = mtl_path
                .as_deref()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned());
            let file = create_file(path, overwrite)?;
            let mut w = BufWriter::new(file);
            write_obj(&mut w, &model, mtllib.as_deref()).map_err(|e| format!("write obj: {e}"))?;
            eprintln!("wrote {}", path.display());
        }

        for part in &model.parts {
            eprintln!(
                "  {:<16} vertices={:<5} triangles={:<5} {}",
                part.name,
                part.mesh.vertex_count(),
                part.mesh.triangle_count(),
                part.material.color
            );
        }
        eprintln!(
            "{}: parts={} vertices={} triangles={} | {}",
            model.archetype,
            model.parts.len(),
            model.vertex_count(),
            model.triangle_count(),
            model.diagnostics.summary()
        );
        for warning in &model.diagnostics.warnings {
            eprintln!("  warning: {warning}");
        }

        Ok(())
    }

    fn generate(detections: &[Detection], seed: Option<u64>) -> ModelSpec {
        let generator = ModelGenerator::new(Catalog::shared());
        match seed {
            Some(seed) => generator.generate_model_from_objects_with_rng(detections, &mut StdRng::seed_from_u64(seed)),
            None => generator.generate_model_from_objects(detections),
        }
    }

    fn read_text(path: &Path) -> Result<String, String> {
        fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))
    }

    fn create_file(path: &Path, overwrite: bool) -> Result<File, String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        File::create(path).map_err(|e| format!("create {}: {e}", path.display()))
    }

    /// Run `write` against the output file, or stdout when none is given.
    fn emit(
        out: Option<&Path>,
        overwrite: bool,
        write: impl FnOnce(&mut dyn Write) -> Result<(), String>,
    ) -> Result<(), String> {
        match out {
            Some(path) => {
                let mut w = BufWriter::new(create_file(path, overwrite)?);
                write(&mut w)?;
                w.flush().map_err(|e| format!("flush {}: {e}", path.display()))?;
                eprintln!("wrote {}", path.display());
                Ok(())
            }
            None => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                write(&mut lock)
            }
        }
    }

    fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
        let before = args.len();
        args.retain(|arg| !names.contains(&arg.as_str()));
        args.len() != before
    }

    /// `RUST_LOG` still overrides the level picked here.
    fn log_level(verbose: bool) -> LevelFilter {
        if verbose { LevelFilter::Debug } else { LevelFilter::Warn }
    }

    fn init_logger(verbose: bool) {
        env_logger::Builder::new()
            .filter_level(log_level(verbose))
            .parse_default_env()
            .format_timestamp(None)
            .init();
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn verbose_flag_is_removed_and_raises_level() {
            let mut args: Vec<String> = ["-v", "build", "spec.json", "--verbose"].map(String::from).to_vec();
            assert!(take_flag(&mut args, &["-v", "--verbose"]));
            assert_eq!(args, ["build", "spec.json"]);
            assert!(!take_flag(&mut args, &["-v", "--verbose"]));

            assert_eq!(log_level(true), LevelFilter::Debug);
            assert_eq!(log_level(false), LevelFilter::Warn);
        }
    }
}
