use std::convert::TryFrom;
use std::path::{ Path, PathBuf };

use clap::{ Parser, Subcommand };
use log::{ error, info };

use subdivision_tracer::Result;
use subdivision_tracer::canvas::Canvas;
use subdivision_tracer::consts::{ NUM_THREADS, OUT_IMAGE, OUT_MESH };
use subdivision_tracer::mesh::Mesh;
use subdivision_tracer::obj::{ self, ObjParser };
use subdivision_tracer::parallel::parallel_render;
use subdivision_tracer::scene::{ MeshJson, Scene };

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a JSON sphere scene to a PPM image
    Render {
        /// Scene description (.json)
        scene: PathBuf,

        /// Output image
        #[clap(short, long, default_value = OUT_IMAGE)]
        out: PathBuf,

        /// Number of render threads
        #[clap(short, long, default_value_t = NUM_THREADS)]
        threads: usize,

        /// Override the scene's reflection bounce limit
        #[clap(long)]
        max_steps: Option<usize>,
    },

    /// Apply Loop subdivision to a triangle mesh
    Subdivide {
        /// Input mesh (.obj or .json)
        mesh: PathBuf,

        /// Number of subdivision passes
        #[clap(short, long, default_value_t = 1)]
        levels: usize,

        /// Output mesh (.obj)
        #[clap(short, long, default_value = OUT_MESH)]
        out: PathBuf,

        /// Mark the edge between two vertex indices as sharp, e.g. `--crease 0,3`
        #[clap(long = "crease", parse(try_from_str = parse_crease))]
        creases: Vec<(usize, usize)>,
    },
}

fn parse_crease(s: &str) -> std::result::Result<(usize, usize), String> {
    let (a, b) = s.split_once(',')
        .ok_or_else(|| format!("expected two comma-separated indices, got {:?}", s))?;
    let index = |v: &str| v.trim().parse::<usize>()
        .map_err(|e| format!("invalid vertex index {:?}: {}", v, e));

    Ok((index(a)?, index(b)?))
}

fn render(scene: &Path, out: &Path, threads: usize, max_steps: Option<usize>) -> Result<()> {
    let mut scene = Scene::load(scene)?;
    if let Some(max_steps) = max_steps {
        scene.tracer = scene.tracer.with_max_steps(max_steps);
    }

    let canvas = if threads > 1 {
        parallel_render(scene.tracer, scene.width, scene.height, threads)
    } else {
        let mut canvas = Canvas::new(scene.width, scene.height);
        scene.tracer.ray_trace(&mut canvas);
        canvas
    };
    canvas.save(out)?;

    info!("Saved render to {}", out.display());
    Ok(())
}

fn load_mesh(path: &Path, creases: &[(usize, usize)]) -> Result<Mesh> {
    let is_json = path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let mut mesh_json = MeshJson::load(path)?;
        mesh_json.creased_edges.extend_from_slice(creases);
        Mesh::try_from(mesh_json)
    } else {
        let mut obj_parser = ObjParser::new(path);
        obj_parser.parse()?;
        if obj_parser.ignored_lines > 0 {
            info!("Skipped {} unsupported lines in {}", obj_parser.ignored_lines, path.display());
        }
        obj_parser.into_mesh(creases)
    }
}

fn subdivide(path: &Path, levels: usize, out: &Path, creases: &[(usize, usize)]) -> Result<()> {
    let mesh = load_mesh(path, creases)?;
    info!("Loaded {} vertices and {} faces from {}",
        mesh.vertex_count(), mesh.face_count(), path.display());

    let refined = mesh.subdivide_n(levels)?;
    obj::save_obj(&refined, out)?;

    info!("Saved {} vertices and {} faces to {}",
        refined.vertex_count(), refined.face_count(), out.display());
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let res = match cli.command {
        Command::Render { scene, out, threads, max_steps } => {
            render(&scene, &out, threads, max_steps)
        },
        Command::Subdivide { mesh, levels, out, creases } => {
            subdivide(&mesh, levels, &out, &creases)
        },
    };

    if let Err(e) = res {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
