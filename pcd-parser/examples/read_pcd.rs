use pcd_parser::{Parser as _, PcdParser};

fn main() {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: read_pcd <FILE.pcd>");
        std::process::exit(2);
    };
    let parser = PcdParser::new(path);

    let point_cloud = parser.parse();

    println!(
        "Number of points: {num_points}",
        num_points = point_cloud.as_ref().unwrap().points.len()
    );

    println!("First point: {:?}", point_cloud.as_ref().unwrap().points[0]);
}
