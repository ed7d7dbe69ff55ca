/*

    Fit bounding volumes for the meshes of a JSON job file
    and report which of them are visible and colliding.

    Usage: boxfit <job>.json [<report>.json]

    @date: Nov, 2025
    @author: Bartu

*/

use std::{self, env, path::Path, time::Instant};
use tracing::{info, warn, error, debug};
use tracing_subscriber;

use fury_bounds::json_parser::parse_job_json;

fn main()  -> Result<(), Box<dyn std::error::Error>> {

    // Logging on console
    tracing_subscriber::fmt::init(); 

    // Parse args
    let args: Vec<String> = env::args().collect();
    let (json_path, report_path): (&str, Option<&str>) = match args.len() {
        1 => {
            warn!("No arguments were provided, setting default job path...");
            ("./inputs/job.json", None)
        }
        2 => (args[1].as_str(), None),
        3 => (args[1].as_str(), Some(args[2].as_str())),
        _ => {
            error!("Usage: {} <job>.json [<report>.json]", args[0]);
            std::process::exit(1);
        }
    };

    // Parse JSON
    info!("Loading job from {}...", json_path);
    let root = parse_job_json(json_path).map_err(|e| {
        error!("Failed to load job: {}", e);
        e
    })?;
    debug!("Job is parsed successfully.\n {:#?}", root);

    let json_path = Path::new(json_path).canonicalize()?;
    let json_dir = json_path.parent().unwrap_or(&json_path);

    let start = Instant::now();
    let report = root.job.run(json_dir)?;
    info!("Job took: {:?}", start.elapsed());

    for mesh in report.meshes.iter() {
        info!(
            "Mesh {}: {} points, OBB valid: {}, area {:.4} (AABB {:.4}), visible: {}, included: {}",
            mesh.id, mesh.point_count, mesh.fit.is_valid, mesh.volume.area(), mesh.aabb.area(), mesh.visible, mesh.included
        );
    }

    if let Some(path) = report_path {
        report.save_json(Path::new(path))?;
    }
    info!("Finished execution.");
    Ok(())
}
