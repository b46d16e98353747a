//! Integration tests for reading events and describing the resolution

use nalgebra::{Matrix4, Vector3, Vector4};
use rstest::{fixture, rstest};
use tastools_reso::{
    calc_covariance, calc_ellipses, parse_events, read_events, write_events_to, Basis, Centering,
    ColumnLayout, Covariance, Event, Projection,
};
use tastools_utils::ErrorKind;

#[fixture]
fn raw() -> Vec<Event> {
    read_events("./data/events_raw.dat", None).unwrap()
}

#[fixture]
fn reduced() -> Vec<Event> {
    read_events("./data/events_reduced.dat", None).unwrap()
}

/// Points at +/- 2 sigma along each lab axis, population variance is sigma²
fn star(sigma: [f64; 4], mean: [f64; 4]) -> Vec<Event> {
    let mut events = Vec::new();
    for axis in 0..4 {
        for sign in [-2.0, 2.0] {
            let mut x = mean;
            x[axis] += sign * sigma[axis];
            events.push(Event::new(Vector3::new(x[0], x[1], x[2]), x[3], 1.0));
        }
    }
    events
}

fn relative_difference(a: &Matrix4<f64>, b: &Matrix4<f64>) -> f64 {
    (a - b).norm() / a.norm()
}

#[rstest]
fn fixtures_are_complete(raw: Vec<Event>, reduced: Vec<Event>) {
    assert_eq!(raw.len(), 240);
    assert_eq!(reduced.len(), 240);

    // a handful of events never reached the detector
    assert_eq!(raw.iter().filter(|e| e.weight == 0.0).count(), 7);
}

#[rstest]
fn layouts_agree(raw: Vec<Event>, reduced: Vec<Event>) {
    let a = calc_covariance(&raw, &Basis::AlongMean).unwrap();
    let b = calc_covariance(&reduced, &Basis::AlongMean).unwrap();

    assert!((a.lab_mean - b.lab_mean).norm() < 1e-9 * a.lab_mean.norm());
    assert!(relative_difference(&a.covariance, &b.covariance) < 1e-8);
    assert!(relative_difference(&a.resolution, &b.resolution) < 1e-6);
    assert!((a.total_weight - b.total_weight).abs() < 1e-9 * a.total_weight);
}

#[rstest]
fn resolution_is_positive_definite(raw: Vec<Event>) {
    let cov = calc_covariance(&raw, &Basis::AlongMean).unwrap();

    assert_eq!(cov.events, 240);
    assert_eq!(cov.resolution, cov.resolution.transpose());
    assert!(cov.resolution.symmetric_eigenvalues().min() > 0.0);

    // R C = 1 in both frames
    let identity = Matrix4::identity();
    assert!((cov.lab_resolution * cov.lab_covariance - identity).norm() < 1e-6);
    assert!((cov.resolution * cov.covariance - identity).norm() < 1e-6);

    // mean Q lies along Q para
    assert!(cov.mean.y.abs() < 1e-12 && cov.mean.z.abs() < 1e-12);
    assert!((cov.mean.x - cov.lab_mean.xyz().norm()).abs() < 1e-12);
}

#[rstest]
#[case(Vector3::new(1.5, 0.0, 0.0), [0, 2, 1])] // case 1
#[case(Vector3::new(0.0, 0.0, 2.0), [2, 0, 1])] // case 2
fn rotated_star(#[case] q: Vector3<f64>, #[case] order: [usize; 3]) {
    let sigma = [0.01, 0.02, 0.03, 0.1];
    let events = star(sigma, [q.x, q.y, q.z, 1.0]);
    let cov = calc_covariance(&events, &Basis::AlongMean).unwrap();

    // (para, perp, up) pick up the lab widths in this order, E stays last
    let expected = [sigma[order[0]], sigma[order[1]], sigma[order[2]], sigma[3]];
    let diagonal = Matrix4::from_diagonal(&Vector4::from(expected.map(|s| s * s)));
    assert!((cov.covariance - diagonal).norm() < 1e-12);
}

#[test]
fn explicit_basis() {
    let sigma = [0.01, 0.02, 0.03, 0.1];
    let events = star(sigma, [1.0, 0.0, 1.0, 0.5]);
    let basis = Basis::Explicit {
        para: Vector3::x(),
        perp: Vector3::new(0.5, 0.0, 1.0),
    };
    let cov = calc_covariance(&events, &basis).unwrap();

    assert!((cov.transform.column(2).xyz() + Vector3::y()).norm() < 1e-12);
    assert!((cov.covariance[(1, 1)] - sigma[2].powi(2)).abs() < 1e-12);
    assert!((cov.covariance[(2, 2)] - sigma[1].powi(2)).abs() < 1e-12);
    assert!((cov.mean - Vector4::new(1.0, 1.0, 0.0, 0.5)).norm() < 1e-12);
}

#[test]
fn degenerate_samples() {
    // every event at the same point
    let same = vec![Event::new(Vector3::new(1.0, 0.0, 0.0), 0.5, 1.0); 10];
    let error = calc_covariance(&same, &Basis::AlongMean).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Kinematic);

    let error = calc_covariance(&same[..3], &Basis::AlongMean).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Kinematic);

    // mean Q along the vertical leaves no scattering plane
    let vertical = star([0.01; 4], [0.0, 1.0, 0.0, 0.0]);
    let error = calc_covariance(&vertical, &Basis::AlongMean).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Geometry);
}

#[rstest]
#[case("1 0 0 0.5 1\n1 0 0 0.5\n")] // case 1
#[case("1 0 0 0.5 1 2 3\n")] // case 2
#[case("1 0 0 zero 1\n")] // case 3
fn malformed_tables(#[case] text: &str) {
    let error = parse_events(text, None).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InputFormat);
}

#[test]
fn missing_file() {
    let error = read_events("./data/not_a_file.dat", None).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InputFormat);
}

#[test]
fn forced_layout() {
    // 11 columns read as reduced events from the kf columns onwards
    let layout = ColumnLayout::Reduced {
        q: 3,
        energy: 9,
        weight: 10,
    };
    let events = read_events("./data/events_raw.dat", Some(layout)).unwrap();
    assert_eq!(events.len(), 240);
    assert!((events[0].q - Vector3::new(0.32832911, -0.02405938, 1.36207065)).norm() < 1e-15);
}

#[rstest]
fn ellipses_of_fixture(raw: Vec<Event>) {
    let cov = calc_covariance(&raw, &Basis::AlongMean).unwrap();
    let ellipses = calc_ellipses(&cov.resolution).unwrap();

    let fwhms = ellipses.ellipsoid.fwhms;
    assert!(fwhms.iter().all(|w| w.is_finite() && *w > 0.0));
    assert!(fwhms.as_slice().windows(2).all(|w| w[0] >= w[1]));

    for projection in Projection::ALL {
        let ellipse = ellipses.projection(projection);
        assert!(ellipse.fwhms[0] >= ellipse.fwhms[1]);
        assert!(ellipse.angle > -std::f64::consts::FRAC_PI_2);
        assert!(ellipse.angle <= std::f64::consts::FRAC_PI_2);

        // a cut is never wider than the full ellipsoid
        assert!(ellipse.fwhms[0] <= fwhms[0] * (1.0 + 1e-12));
    }
}

#[rstest]
fn export_rotated_events(raw: Vec<Event>) {
    let cov: Covariance = calc_covariance(&raw, &Basis::AlongMean).unwrap();
    let rotated = cov.transform_events(&raw, Centering::Mean);

    let mut buffer = Vec::new();
    write_events_to(csv::Writer::from_writer(&mut buffer), &rotated).unwrap();

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    assert_eq!(
        reader.headers().unwrap(),
        vec!["qpara", "qperp", "qup", "energy"]
    );

    let rows: Vec<(f64, f64, f64, f64)> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 240);
    let (qpara, qperp, qup, energy) = rows[17];
    assert_eq!(Vector4::new(qpara, qperp, qup, energy), rotated[17]);
}
