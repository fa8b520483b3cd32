use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tilestream::{
    ChunkFill, ChunkKey, DirectoryProvider, MapDescriptor, Point, Size, StreamConfig, StreamSource,
    TileGrid, TileRect,
};

#[derive(Parser)]
#[command(name = "tilemap-inspect")]
#[command(about = "Inspect exported binary tile maps")]
struct Cli {
    /// Directory the map resources are resolved against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// JSON stream config (cache budgets, chunk compression)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print header, layers and object groups
    Info {
        map: String,
    },
    /// Dump one chunk of an infinite layer
    Chunk {
        map: String,
        #[arg(long)]
        layer: String,
        #[arg(long, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, allow_hyphen_values = true)]
        y: i32,
    },
    /// Dump a rectangle of a layer
    Region {
        map: String,
        #[arg(long)]
        layer: String,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        y: i32,
        #[arg(long, default_value_t = 32)]
        width: u32,
        #[arg(long, default_value_t = 16)]
        height: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => StreamConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => StreamConfig::default(),
    };
    let provider = DirectoryProvider::new(cli.root.clone());

    match cli.command {
        Commands::Info { map } => {
            let map = MapDescriptor::load(&provider, &map, &config)?;
            print_info(&map);
        }
        Commands::Chunk { map, layer, x, y } => {
            let mut map = MapDescriptor::load(&provider, &map, &config)?;
            let size = map.chunk_size();
            let mut grid = TileGrid::new(Point::new(0, 0), size);
            let source = StreamSource::new(&provider, &config.compression);

            match map.load_chunk(source, &layer, ChunkKey::pack(x, y), Point::new(0, 0), None, &mut grid)? {
                ChunkFill::Empty => println!("chunk ({x}, {y}) of '{layer}': empty"),
                ChunkFill::Loaded { tiles } => println!("chunk ({x}, {y}) of '{layer}': {tiles} tiles"),
            }
            print_grid(&grid);

            if let Some((indices, chunks)) = map.cache_stats() {
                println!(
                    "cache: {} index tables, {} chunks ({} / {} bytes)",
                    indices.entries, chunks.entries, chunks.resident_bytes, chunks.budget
                );
            }
        }
        Commands::Region { map, layer, x, y, width, height } => {
            let mut map = MapDescriptor::load(&provider, &map, &config)?;
            let rect = TileRect::new(x, y, width, height);
            let mut grid = TileGrid::new(Point::new(0, 0), Size::new(width, height));

            if map.is_infinite() {
                let source = StreamSource::new(&provider, &config.compression);
                let fill = map.load_area(source, &layer, rect, Point::new(0, 0), None, &mut grid)?;
                println!(
                    "'{layer}' at ({x}, {y}) {width}x{height}: {} chunks loaded, {} empty, {} tiles",
                    fill.loaded_chunks, fill.empty_chunks, fill.tiles
                );
            } else {
                let written = map.load_region(&provider, &layer, rect, Point::new(0, 0), None, &mut grid)?;
                println!("'{layer}' at ({x}, {y}) {width}x{height}: {written} tiles");
            }
            print_grid(&grid);
        }
    }

    Ok(())
}

fn print_info(map: &MapDescriptor) {
    println!("map:        {}", map.base_path());
    println!("version:    {}", map.version());
    if map.is_infinite() {
        let chunk = map.chunk_size();
        println!("layout:     infinite, {}x{} chunks", chunk.width, chunk.height);
    } else {
        let size = map.size();
        println!("layout:     finite, {}x{} tiles", size.width, size.height);
    }
    let bg = map.background();
    println!("background: #{:02x}{:02x}{:02x}{:02x}", bg.r, bg.g, bg.b, bg.a);
    for (key, value) in map.properties().iter() {
        println!("  {key} = {value:?}");
    }

    println!("\nlayers:");
    for layer in map.layers() {
        print!(
            "  {:24} {:08x} {}x{} alpha={} visible={}",
            layer.name, layer.hash, layer.size.width, layer.size.height, layer.alpha, layer.visible
        );
        if map.is_infinite() {
            print!(" chunks={}", layer.chunk_count);
        }
        println!();
    }

    println!("\nobject groups:");
    for group in map.object_groups() {
        println!("  {:24} {} objects", group.name, group.objects.len());
        for object in &group.objects {
            println!(
                "    {:20} {:?} at ({}, {}) {}x{}",
                object.name, object.shape, object.rect.x, object.rect.y, object.rect.width, object.rect.height
            );
        }
    }

    println!(
        "\ntilesets with properties: {}",
        map.tile_property_table().tileset_count()
    );
}

fn print_grid(grid: &TileGrid) {
    let size = grid.size();
    let origin = grid.origin();
    for y in 0..size.height as i32 {
        let row: Vec<String> = (0..size.width as i32)
            .map(|x| match grid.cell(origin.x + x, origin.y + y) {
                Some(cell) if !cell.is_empty() => format!("{:>5}", cell.tile_id),
                _ => "    .".to_string(),
            })
            .collect();
        println!("{}", row.join(""));
    }
}
