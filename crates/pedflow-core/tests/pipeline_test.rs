use pedflow_core::{
    AnalysisConfig, CellSize, Error, FrameWindow, GeometryError, InputFormat, ResolvedWindow,
    detect_format, diagram_report, export, parse_geometry, parse_ifd, parse_trajectory_txt,
    pedestrian_count_series, profile_report,
};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> String {
    let path = fixtures_root().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read fixture {}: {e}", path.display()))
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .join("fixtures")
}

#[test]
fn fixtures_are_identified_by_content() {
    assert_eq!(
        detect_format(&fixture("corridor_geometry.xml")).unwrap(),
        InputFormat::Geometry
    );
    assert_eq!(
        detect_format(&fixture("corridor_ifd.txt")).unwrap(),
        InputFormat::IndividualFd
    );
    assert_eq!(
        detect_format(&fixture("corridor_trajectory.txt")).unwrap(),
        InputFormat::TrajectoryText
    );
}

#[test]
fn corridor_geometry_has_three_walls_and_one_pillar() {
    let geo = parse_geometry(&fixture("corridor_geometry.xml")).unwrap();
    assert_eq!(geo.walls.len(), 3);
    assert_eq!(geo.obstacles.len(), 1);
    assert_eq!(geo.obstacles[&0].vertices.len(), 4);
    let bbox = geo.bounding_box().unwrap();
    assert_eq!(
        (bbox.xmin, bbox.xmax, bbox.ymin, bbox.ymax),
        (0.0, 8.0, 0.0, 4.0)
    );
}

#[test]
fn corridor_profiles_for_a_frame_window() {
    let geo = parse_geometry(&fixture("corridor_geometry.xml")).unwrap();
    let samples = parse_ifd(&fixture("corridor_ifd.txt")).unwrap();
    assert_eq!(samples.len(), 30);

    let config = AnalysisConfig::default()
        .with_cell_size(CellSize::uniform(1.0))
        .with_window(FrameWindow::new(Some(12), Some(15)));
    let report = profile_report(&geo, &samples, &config).unwrap();

    assert_eq!(report.window, ResolvedWindow { begin: 12, end: 15 });
    assert_eq!(report.windowed_samples, 12);
    assert_eq!(report.fields.dropped, 0);
    assert!(report.grid.x.last().unwrap() >= 8.0 + 1.0);

    let density = &report.fields.density;
    let velocity = &report.fields.velocity;
    assert_eq!(density.counts().iter().sum::<u32>(), 12);
    // Pedestrian 1 walks along y = 1 through x = 1.4, 1.8 (frames 12, 13) and 2.2, 2.6.
    assert_eq!(density.count(1, 1), 2);
    assert_eq!(density.value(1, 1), 1.125);
    assert_eq!(velocity.value(1, 1), 1.25);
    assert_eq!(density.value(1, 2), 1.125);
    assert!(density.rows_iter().next().unwrap().iter().all(|&v| v == 0.0));

    // Pedestrian 3 contributes 2.25, 2.0 and 2.25 to the cell at row 3, column 2.
    assert_eq!(density.count(3, 2), 3);
    assert_eq!(report.density_summary.max, 6.5 / 3.0);
    assert_eq!(report.density_summary.min, 0.0);
}

#[test]
fn default_profile_grid_covers_the_walls() {
    let geo = parse_geometry(&fixture("corridor_geometry.xml")).unwrap();
    let samples = parse_ifd(&fixture("corridor_ifd.txt")).unwrap();
    let report = profile_report(&geo, &samples, &AnalysisConfig::default()).unwrap();
    assert_eq!(report.window, ResolvedWindow { begin: 10, end: 19 });
    assert!(report.grid.x.last().unwrap() >= 8.0 + 0.2);
    assert!(report.grid.y.last().unwrap() >= 4.0 + 0.2);
    assert_eq!(report.fields.dropped, 0);
    assert_eq!(report.fields.density.counts().iter().sum::<u32>(), 30);
}

#[test]
fn corridor_fundamental_diagram() {
    let samples = parse_ifd(&fixture("corridor_ifd.txt")).unwrap();
    let config = AnalysisConfig::default().with_window(FrameWindow::new(Some(12), Some(15)));
    let report = diagram_report(&samples, &config).unwrap();

    assert_eq!(report.series.len(), 10);
    assert_eq!(report.points.len(), 12);
    let begin = report.begin_marker.unwrap();
    assert_eq!((begin.frame, begin.density, begin.velocity), (12, 1.5, 1.0));
    let end = report.end_marker.unwrap();
    assert_eq!((end.frame, end.density), (15, 1.75));

    let maxima = report.maxima.unwrap();
    assert_eq!(maxima.density, 2.25);
    assert_eq!(maxima.velocity, 1.25);
    assert_eq!(maxima.flow, 1.75);

    let tsv = export::frame_series_to_tsv(&report.series);
    assert_eq!(tsv.lines().count(), 11);
    assert_eq!(tsv.lines().nth(3), Some("12\t1.5\t1"));
}

#[test]
fn pedestrian_counts_from_the_trajectory_file() {
    let traj = parse_trajectory_txt(&fixture("corridor_trajectory.txt")).unwrap();
    assert_eq!(traj.framerate, Some(8.0));
    let counts = pedestrian_count_series(&traj.points, traj.framerate);
    assert_eq!(counts.len(), 16);
    assert_eq!(counts[0].count, 3);
    assert_eq!((counts[12].frame, counts[12].time, counts[12].count), (12, 1.5, 2));
}

#[test]
fn profiles_need_walls_and_samples() {
    let samples = parse_ifd(&fixture("corridor_ifd.txt")).unwrap();
    let no_walls = "<geometry><rooms><room><subroom/></room></rooms></geometry>";
    assert!(matches!(
        parse_geometry(no_walls),
        Err(Error::Geometry(GeometryError::NoWalls))
    ));

    let geo = parse_geometry(&fixture("corridor_geometry.xml")).unwrap();
    assert!(matches!(
        profile_report(&geo, &[], &AnalysisConfig::default()),
        Err(Error::EmptyDataset { .. })
    ));

    let bad_cell = AnalysisConfig::default().with_cell_size(CellSize { dx: 0.0, dy: 1.0 });
    assert!(matches!(
        profile_report(&geo, &samples, &bad_cell),
        Err(Error::InvalidGrid { .. })
    ));
}

#[test]
fn millimetre_geometry_is_rejected_instead_of_allocating() {
    let xml = r#"<geometry><rooms><room><subroom>
        <polygon caption="wall">
            <vertex px="0" py="0"/><vertex px="10000" py="0"/>
        </polygon>
        <polygon caption="wall">
            <vertex px="0" py="10000"/><vertex px="10000" py="10000"/>
        </polygon>
    </subroom></room></rooms></geometry>"#;
    let geo = parse_geometry(xml).unwrap();
    let samples = parse_ifd("10\t1\t500\t500\t0\t1.0\t1.0\n").unwrap();
    let err = profile_report(&geo, &samples, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidGrid { .. }), "{err}");
}
