use std::process::ExitCode;

use impoly::config::{LapseSource, Method, Params, Reduction};
use impoly::error::PolyError;

struct Cli {
    filename: String,
    params: Params,
    out: Option<String>,
    show_metrics: bool,
    verbose: bool,
}

fn bad_param(name: &str, value: &str) -> PolyError {
    PolyError::BadParam {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_grid_dims(value: &str) -> Option<(usize, usize)> {
    let v = value.trim().trim_start_matches('(').trim_end_matches(')');
    if let Some((a, b)) = v.split_once(',') {
        let x = a.trim().parse().ok()?;
        let y = b.trim().parse().ok()?;
        Some((x, y))
    } else {
        let n = v.parse().ok()?;
        Some((n, n))
    }
}

fn next_value<'a>(
    it: &mut std::slice::Iter<'a, String>,
    name: &str,
) -> Result<&'a String, PolyError> {
    it.next().ok_or_else(|| bad_param(name, "<missing value>"))
}

fn parse_args(args: &[String]) -> Result<Cli, PolyError> {
    let mut cli = Cli {
        filename: String::new(),
        params: Params::default(),
        out: None,
        show_metrics: false,
        verbose: false,
    };

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--method" => {
                let v = next_value(&mut it, "--method")?;
                cli.params.method = match v.chars().next() {
                    Some('c') => Method::Contour,
                    Some('t') | Some('m') => Method::Mesh,
                    _ => return Err(bad_param("--method", v)),
                };
            }
            "--thresh" => {
                let v = next_value(&mut it, "--thresh")?;
                let t: u8 = v.parse().map_err(|_| bad_param("--thresh", v))?;
                cli.params.contour.bw_thresh = t;
                cli.params.mesh.bw_thresh = t;
            }
            "--reduction" => {
                let v = next_value(&mut it, "--reduction")?;
                cli.params.contour.reduction = match v.chars().next() {
                    Some('f') => Reduction::Fixed,
                    Some('v') => Reduction::Variable,
                    Some('h') => Reduction::Hybrid,
                    _ => return Err(bad_param("--reduction", v)),
                };
            }
            "--len" => {
                let v = next_value(&mut it, "--len")?;
                cli.params.contour.r_len = v.parse().map_err(|_| bad_param("--len", v))?;
            }
            "--maxdist" => {
                let v = next_value(&mut it, "--maxdist")?;
                cli.params.contour.r_max_dist =
                    v.parse().map_err(|_| bad_param("--maxdist", v))?;
            }
            "--pathdist" => {
                let v = next_value(&mut it, "--pathdist")?;
                cli.params.contour.path_fuse_dist =
                    v.parse().map_err(|_| bad_param("--pathdist", v))?;
            }
            "--fusedist" => {
                let v = next_value(&mut it, "--fusedist")?;
                cli.params.contour.point_fuse_dist =
                    v.parse().map_err(|_| bad_param("--fusedist", v))?;
            }
            "--x" => {
                let v = next_value(&mut it, "--x")?;
                cli.params.mesh.grid_h = v.parse().map_err(|_| bad_param("--x", v))?;
            }
            "--y" => {
                let v = next_value(&mut it, "--y")?;
                cli.params.mesh.grid_v = v.parse().map_err(|_| bad_param("--y", v))?;
            }
            "--xy" => {
                let v = next_value(&mut it, "--xy")?;
                let (x, y) = parse_grid_dims(v).ok_or_else(|| bad_param("--xy", v))?;
                cli.params.mesh.grid_h = x;
                cli.params.mesh.grid_v = y;
            }
            "--it" => {
                let v = next_value(&mut it, "--it")?;
                cli.params.mesh.iterations = v.parse().map_err(|_| bad_param("--it", v))?;
            }
            "--minlen" => {
                let v = next_value(&mut it, "--minlen")?;
                cli.params.mesh.min_e_len = v.parse().map_err(|_| bad_param("--minlen", v))?;
            }
            "--lapse" => {
                let v = next_value(&mut it, "--lapse")?;
                cli.params.mesh.lapse_source = match v.chars().next() {
                    Some('b') => LapseSource::Bw,
                    Some('c') => LapseSource::Color,
                    _ => return Err(bad_param("--lapse", v)),
                };
            }
            "--config" => {
                let v = next_value(&mut it, "--config")?;
                let text = std::fs::read_to_string(v)?;
                cli.params = impoly::config::params_from_json(&text)?;
            }
            "--out" => {
                cli.out = Some(next_value(&mut it, "--out")?.clone());
            }
            "--verbose" => cli.verbose = true,
            "--timelapse" => cli.params.mesh.timelapse = true,
            "--metrics" => cli.show_metrics = true,
            other => {
                if other.starts_with("--") {
                    return Err(bad_param(other, "unknown flag"));
                }
                if !cli.filename.is_empty() {
                    return Err(bad_param("filename", other));
                }
                cli.filename = other.to_string();
            }
        }
    }

    if cli.filename.is_empty() {
        return Err(bad_param("filename", "<missing>"));
    }

    cli.params.mesh.verbose = cli.verbose;
    Ok(cli)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "im-io"))]
fn run(args: &[String]) -> Result<(), PolyError> {
    let _ = parse_args(args)?;
    Err(bad_param("build", "this binary was built without the im-io feature"))
}

#[cfg(feature = "im-io")]
fn run(args: &[String]) -> Result<(), PolyError> {
    use std::fs::File;
    use std::io::{BufReader, BufWriter};
    use std::path::PathBuf;

    use log::info;

    use impoly::im::{io, Canvas};
    use impoly::{pipeline, poly};

    let cli = parse_args(args)?;

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let (grey, rgba) = io::load(&cli.filename)?;

    let input = PathBuf::from(&cli.filename);
    let out_path = match &cli.out {
        Some(o) => PathBuf::from(o),
        None => input.with_extension("poly"),
    };

    let paths = match cli.params.method {
        Method::Contour => {
            info!("edge extraction method: canny contours");
            let canvas = Canvas::build(&grey, Some(&rgba), cli.params.contour.bw_thresh);
            pipeline::contour_pipeline(&canvas, &cli.params.contour)
        }
        Method::Mesh => {
            info!("edge extraction method: mesh refinement");
            let canvas = Canvas::build(&grey, Some(&rgba), cli.params.mesh.bw_thresh);
            let (paths, frames) = pipeline::mesh_pipeline(&canvas, &cli.params.mesh);

            #[cfg(feature = "timelapse")]
            if cli.params.mesh.timelapse {
                let gif_path = input.with_file_name(format!(
                    "{}_{}x{}_{}it_minlen={}.gif",
                    input.file_stem().and_then(|s| s.to_str()).unwrap_or("out"),
                    cli.params.mesh.grid_h,
                    cli.params.mesh.grid_v,
                    cli.params.mesh.iterations,
                    cli.params.mesh.min_e_len,
                ));
                impoly::timelapse::write_gif(&gif_path, &frames)?;
                info!("timelapse written to {}", gif_path.display());
            }
            #[cfg(not(feature = "timelapse"))]
            let _ = frames;

            paths
        }
    };

    let mut out = BufWriter::new(File::create(&out_path)?);
    poly::write_poly(&mut out, &paths)?;
    drop(out);
    info!("wrote {}", out_path.display());

    if cli.show_metrics {
        let data = poly::read_poly(BufReader::new(File::open(&out_path)?))?;
        let m = poly::metrics(&data);
        info!(
            "{} vertices, {} edges, {} holes; edge length mean {:.2} std {:.2} min {:.2} max {:.2}",
            m.vertices, m.edges, m.holes, m.len_mean, m.len_std_dev, m.len_min, m.len_max
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_mesh_flags() {
        let cli = parse_args(&argv(&[
            "shape.png",
            "--method",
            "t",
            "--xy",
            "(16,24)",
            "--it",
            "30",
            "--minlen",
            "2",
            "--timelapse",
        ]))
        .unwrap();

        assert_eq!(cli.filename, "shape.png");
        assert_eq!(cli.params.method, Method::Mesh);
        assert_eq!((cli.params.mesh.grid_h, cli.params.mesh.grid_v), (16, 24));
        assert_eq!(cli.params.mesh.iterations, 30);
        assert_eq!(cli.params.mesh.min_e_len, 2.0);
        assert!(cli.params.mesh.timelapse);
    }

    #[test]
    fn parses_contour_flags_with_prefixes() {
        let cli = parse_args(&argv(&[
            "shape.png",
            "--reduction",
            "var",
            "--maxdist",
            "2.5",
            "--pathdist",
            "10",
            "--thresh",
            "200",
        ]))
        .unwrap();

        assert_eq!(cli.params.method, Method::Contour);
        assert_eq!(cli.params.contour.reduction, Reduction::Variable);
        assert_eq!(cli.params.contour.r_max_dist, 2.5);
        assert_eq!(cli.params.contour.path_fuse_dist, 10.0);
        assert_eq!(cli.params.contour.bw_thresh, 200);
        assert_eq!(cli.params.mesh.bw_thresh, 200);
    }

    #[test]
    fn rejects_missing_filename_and_bad_values() {
        assert!(parse_args(&argv(&["--method", "c"])).is_err());
        assert!(parse_args(&argv(&["a.png", "--it", "soon"])).is_err());
        assert!(parse_args(&argv(&["a.png", "--wat"])).is_err());
        assert!(parse_args(&argv(&["a.png", "b.png"])).is_err());
    }

    #[test]
    fn xy_accepts_single_number() {
        assert_eq!(parse_grid_dims("12"), Some((12, 12)));
        assert_eq!(parse_grid_dims("(8, 9)"), Some((8, 9)));
        assert_eq!(parse_grid_dims("8,9"), Some((8, 9)));
        assert_eq!(parse_grid_dims("x"), None);
    }
}
