//! bmf-export - scene export tool
//!
//! Converts 3D scenes (glTF/GLB, or anything Assimp reads with the `assimp`
//! feature) to `.bmf` binary assets.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use bmf_export::formats::BMF_EXT;
use bmf_export::{ConvertOptions, MissingTexturePolicy, ResolveOptions, convert_scene, manifest};

#[derive(Parser)]
#[command(name = "bmf-export")]
#[command(about = "Scene export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a single scene file
    Scene {
        /// Input scene file
        input: PathBuf,

        /// Output .bmf file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What to do when a texture file is missing: dialog, skip or keep
        #[arg(long)]
        missing_texture: Option<MissingTexturePolicy>,

        /// Don't ask for a diffuse map when a material has none
        #[arg(long)]
        no_force_diffuse: bool,

        /// Don't ask for a normal map when a material has none
        #[arg(long)]
        no_force_normal: bool,

        /// Uniform scene scale (overrides the per-format correction)
        #[arg(long)]
        scale: Option<f32>,
    },

    /// Build scenes from a manifest file
    Build {
        /// Path to scenes.toml manifest
        #[arg(default_value = "scenes.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to scenes.toml manifest
        #[arg(default_value = "scenes.toml")]
        manifest: PathBuf,
    },

    /// Decode a .bmf file and print its contents
    Info {
        /// Input .bmf file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scene {
            input,
            output,
            missing_texture,
            no_force_diffuse,
            no_force_normal,
            scale,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(BMF_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let options = ConvertOptions {
                resolve: ResolveOptions {
                    force_diffuse_map: !no_force_diffuse,
                    force_normal_map: !no_force_normal,
                },
                scale,
                ..Default::default()
            };
            let mut resolver = missing_texture.unwrap_or_default().resolver()?;
            convert_scene(&input, &output, resolver.as_mut(), &options)?;
            tracing::info!("Done!");
        }

        Commands::Build { manifest, output } => {
            tracing::info!("Building scenes from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Info { input } => print_info(&input)?,
    }

    Ok(())
}

fn print_info(input: &Path) -> Result<()> {
    let scene = bmf_common::read_scene_file(input)
        .with_context(|| format!("Failed to read scene: {:?}", input))?;

    println!("{}", input.display());
    println!(
        "  {} meshes, {} vertices, {} triangles",
        scene.meshes.len(),
        scene.vertex_count(),
        scene.triangle_count()
    );
    println!("  position {:?}", scene.position.to_array());
    if scene.transform != glam::Mat4::IDENTITY {
        println!("  transform {:?}", scene.transform.to_cols_array());
    }

    println!("  materials: {}", scene.materials.len());
    for (i, m) in scene.materials.iter().enumerate() {
        println!(
            "    [{}] diffuse {:?} specular {:?} emissive {:?} shininess {}",
            i,
            &m.diffuse()[..3],
            &m.specular()[..3],
            &m.emissive()[..3],
            m.shininess()
        );
        println!(
            "        diffuse map: {}, normal map: {}",
            m.diffuse_map().unwrap_or("-"),
            m.normal_map().unwrap_or("-")
        );
    }

    println!("  meshes:");
    for (i, mesh) in scene.meshes.iter().enumerate() {
        println!(
            "    [{}] {} vertices, {} indices, material {}, textures {:?} ({})",
            i,
            mesh.vertex_count(),
            mesh.indices_count(),
            mesh.material_index,
            scene.mesh_texture_ids(mesh),
            scene.diffuse_texture(mesh).unwrap_or("-")
        );
    }
    Ok(())
}
