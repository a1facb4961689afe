//! End-to-end pipeline runs with hosting and provider both mocked.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fswap_akool::{AkoolClient, AkoolConfig, AkoolError, FaceSwapPipeline, PollConfig};
use fswap_hosting::{HostingBackend, HostingConfig, TempHostUploader};
use fswap_models::{ChannelObserver, NullObserver, SwapEvent, SwapPhase};

const SUBMIT_PATH: &str = "/api/open/v3/faceswap/highquality/specifyvideo";
const RESULT_PATH: &str = "/api/open/v3/faceswap/result/listbyids";
const DETECT_PATH: &str = "/interface/detect-api/detect_faces";
const TMPFILES_PATH: &str = "/api/v1/upload";
const FILEIO_PATH: &str = "/fileio";

const FACE_URL: &str = "https://files.test/abc/face.jpg";
const VIDEO_URL: &str = "https://files.test/def/video.mp4";

struct TestInputs {
    _dir: tempfile::TempDir,
    face: PathBuf,
    video: PathBuf,
}

fn test_inputs() -> TestInputs {
    let dir = tempfile::tempdir().unwrap();
    let face = dir.path().join("face.jpg");
    let video = dir.path().join("video.mp4");
    std::fs::write(&face, b"jpeg bytes").unwrap();
    std::fs::write(&video, b"mp4 bytes").unwrap();
    TestInputs {
        _dir: dir,
        face,
        video,
    }
}

fn pipeline_for(server: &MockServer, poll: PollConfig) -> FaceSwapPipeline {
    let client = AkoolClient::new(
        AkoolConfig::new("test-key")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(2))
            .with_max_retries(0),
    )
    .unwrap();
    let uploader = TempHostUploader::new(HostingConfig {
        tmpfiles_url: format!("{}{}", server.uri(), TMPFILES_PATH),
        fileio_url: format!("{}{}", server.uri(), FILEIO_PATH),
        timeout: Duration::from_secs(2),
        backends: vec![HostingBackend::TmpFiles, HostingBackend::FileIo],
    })
    .unwrap();
    FaceSwapPipeline::new(client, uploader).with_poll_config(poll)
}

fn fast_poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
    }
}

/// Mount hosting mocks: first upload resolves to the face URL, second to
/// the video URL.
async fn mount_hosting(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TMPFILES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "url": FACE_URL }
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(TMPFILES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "url": VIDEO_URL }
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

async fn mount_detect(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(DETECT_PATH))
        .and(body_partial_json(json!({ "url": FACE_URL })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error_code": 0,
            "faces_obj": {
                "0": { "landmarks": [[[100.6, 200.2], [150.9, 250.1]]] }
            }
        })))
        .mount(server)
        .await;
}

fn drain(rx: &mut UnboundedReceiver<SwapEvent>) -> Vec<SwapEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_happy_path_end_to_end() {
    let server = MockServer::start().await;
    mount_hosting(&server).await;
    mount_detect(&server).await;

    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .and(body_partial_json(json!({
            "sourceImage": [{ "path": FACE_URL, "opts": "100,200:150,250" }],
            "targetImage": [{ "path": FACE_URL, "opts": "100,200:150,250" }],
            "modifyVideo": VIDEO_URL,
            "face_enhance": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1000,
            "data": { "_id": "job-1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .and(query_param("_ids", "job-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": 1000, "data": { "result": [] } })),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .and(query_param("_ids", "job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1000,
            "data": { "result": [{ "faceswap_status": 2, "url": "https://cdn/final.mp4" }] }
        })))
        .mount(&server)
        .await;

    let inputs = test_inputs();
    let pipeline = pipeline_for(&server, fast_poll());
    let (observer, mut rx) = ChannelObserver::new();

    let url = pipeline
        .run(&inputs.face, &inputs.video, true, &observer)
        .await
        .unwrap();
    assert_eq!(url, "https://cdn/final.mp4");

    let events = drain(&mut rx);
    let phases: Vec<SwapPhase> = events.iter().map(|e| e.phase).collect();
    assert_eq!(
        &phases[..4],
        &[
            SwapPhase::UploadingFace,
            SwapPhase::UploadingVideo,
            SwapPhase::DetectingFace,
            SwapPhase::Submitting,
        ]
    );
    assert!(phases.contains(&SwapPhase::Polling));
    assert_eq!(*phases.last().unwrap(), SwapPhase::Complete);
}

#[tokio::test]
async fn test_no_face_aborts_before_submission() {
    let server = MockServer::start().await;
    mount_hosting(&server).await;

    Mock::given(method("POST"))
        .and(path(DETECT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error_code": 0,
            "faces_obj": {}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let inputs = test_inputs();
    let pipeline = pipeline_for(&server, fast_poll());

    assert!(matches!(
        pipeline
            .run(&inputs.face, &inputs.video, true, &NullObserver)
            .await,
        Err(AkoolError::NoFaceDetected)
    ));
}

#[tokio::test]
async fn test_never_terminal_job_times_out() {
    let server = MockServer::start().await;
    mount_hosting(&server).await;
    mount_detect(&server).await;

    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1000,
            "data": { "_id": "job-2" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1000,
            "data": { "result": [{ "faceswap_status": 1 }] }
        })))
        .mount(&server)
        .await;

    let inputs = test_inputs();
    let pipeline = pipeline_for(
        &server,
        PollConfig {
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(80),
        },
    );

    assert!(matches!(
        pipeline
            .run(&inputs.face, &inputs.video, true, &NullObserver)
            .await,
        Err(AkoolError::PollTimeout { .. })
    ));
}

#[tokio::test]
async fn test_provider_failure_surfaces_diagnostic() {
    let server = MockServer::start().await;
    mount_hosting(&server).await;
    mount_detect(&server).await;

    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1000,
            "data": { "_id": "job-3" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1000,
            "data": { "result": [{ "faceswap_status": 1 }] }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1000,
            "data": { "result": [{ "faceswap_status": 3, "alg_msg": "low quality source video" }] }
        })))
        .mount(&server)
        .await;

    let inputs = test_inputs();
    let pipeline = pipeline_for(&server, fast_poll());

    match pipeline
        .run(&inputs.face, &inputs.video, true, &NullObserver)
        .await
        .unwrap_err()
    {
        AkoolError::JobFailed { message, .. } => {
            assert_eq!(message, "low quality source video");
        }
        other => panic!("expected JobFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_hosting_fallback_inside_pipeline() {
    let server = MockServer::start().await;

    // tmpfiles always refuses; both uploads land on file.io.
    Mock::given(method("POST"))
        .and(path(TMPFILES_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FILEIO_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "link": FACE_URL
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FILEIO_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "link": VIDEO_URL
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    mount_detect(&server).await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1000,
            "data": { "_id": "job-4" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1000,
            "data": { "result": [{ "faceswap_status": 2, "url": "https://cdn/out.mp4" }] }
        })))
        .mount(&server)
        .await;

    let inputs = test_inputs();
    let pipeline = pipeline_for(&server, fast_poll());

    let url = pipeline
        .run(&inputs.face, &inputs.video, true, &NullObserver)
        .await
        .unwrap();
    assert_eq!(url, "https://cdn/out.mp4");
}

#[tokio::test]
async fn test_missing_input_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let inputs = test_inputs();
    let pipeline = pipeline_for(&server, fast_poll());
    let missing = inputs._dir.path().join("nope.jpg");

    match pipeline
        .run(&missing, &inputs.video, true, &NullObserver)
        .await
        .unwrap_err()
    {
        AkoolError::MissingInput(path) => assert_eq!(path, missing),
        other => panic!("expected MissingInput, got {other:?}"),
    }
}
