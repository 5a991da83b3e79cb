use std::time::{Duration, SystemTime, UNIX_EPOCH};
use trillium::{KnownHeaderName, Status};
use trillium_conditional::*;
use trillium_testing::prelude::*;

// Sat, 06 Jan 2007 12:42:12 GMT
const LMT: &str = "Sat, 06 Jan 2007 12:42:12 GMT";

fn lmt() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_168_087_332)
}

fn modified_at(time: Option<SystemTime>) -> ModificationValidator<impl LastModifiedSource> {
    ModificationValidator::new(move |_: &Conn| Some(ModificationDescriptor::new(time)))
}

fn last_modified_header(conn: &Conn) -> Option<&str> {
    conn.inner()
        .response_headers()
        .get_str(KnownHeaderName::LastModified)
}

#[test]
fn evaluate() {
    let validator = modified_at(Some(lmt()));
    assert!(!validator.evaluate(&get("/")));
    assert!(!validator.evaluate(&get("/").with_request_header("if-none-match", "*")));
    assert!(validator.evaluate(&get("/").with_request_header("if-modified-since", LMT)));
    assert!(validator.evaluate(&get("/").with_request_header("if-unmodified-since", LMT)));
    assert!(validator.evaluate(&get("/").with_request_header("if-modified-since", "garbage")));
}

#[test]
fn if_modified_since() {
    let conn = get("/").with_request_header("if-modified-since", LMT);

    assert!(!modified_at(Some(lmt())).is_valid(&conn).unwrap());
    assert!(modified_at(Some(lmt() + Duration::from_secs(1))).is_valid(&conn).unwrap());
    assert!(!modified_at(Some(lmt() - Duration::from_secs(1))).is_valid(&conn).unwrap());
}

#[test]
fn header_time_relative_to_resource_time() {
    let resource = modified_at(Some(lmt()));

    let one_second_earlier = httpdate::fmt_http_date(lmt() - Duration::from_secs(1));
    let conn = get("/").with_request_header("if-modified-since", one_second_earlier);
    assert!(resource.is_valid(&conn).unwrap());

    let one_second_later = httpdate::fmt_http_date(lmt() + Duration::from_secs(1));
    let conn = get("/").with_request_header("if-modified-since", one_second_later);
    assert!(!resource.is_valid(&conn).unwrap());
}

#[test]
fn subsecond_precision_is_ignored() {
    let conn = get("/").with_request_header("if-modified-since", LMT);
    let validator = modified_at(Some(lmt() + Duration::from_millis(750)));
    assert!(!validator.is_valid(&conn).unwrap());
}

#[test]
fn if_unmodified_since() {
    let conn = get("/").with_request_header("if-unmodified-since", LMT);

    assert!(modified_at(Some(lmt())).is_valid(&conn).unwrap());
    assert!(!modified_at(Some(lmt() + Duration::from_secs(1))).is_valid(&conn).unwrap());
    assert!(modified_at(Some(lmt() - Duration::from_secs(1))).is_valid(&conn).unwrap());
}

#[test]
fn if_modified_since_takes_precedence() {
    let conn = get("/")
        .with_request_header("if-modified-since", LMT)
        .with_request_header("if-unmodified-since", LMT);
    assert!(!modified_at(Some(lmt())).is_valid(&conn).unwrap());
}

#[test]
fn unparsable_dates_count_as_modified() {
    let validator = modified_at(Some(lmt()));

    let conn = get("/").with_request_header("if-modified-since", "last tuesday");
    assert!(validator.is_valid(&conn).unwrap());

    let conn = get("/").with_request_header("if-unmodified-since", "last tuesday");
    assert!(!validator.is_valid(&conn).unwrap());
}

#[test]
fn header_parameters_are_ignored() {
    let conn = get("/").with_request_header("if-modified-since", format!("{LMT}; length=1024"));
    assert!(!modified_at(Some(lmt())).is_valid(&conn).unwrap());
}

#[test]
fn missing_metadata_fails_open() {
    let conn = get("/").with_request_header("if-modified-since", LMT);
    assert!(modified_at(None).is_valid(&conn).unwrap());

    let no_opinion =
        ModificationValidator::new(|_: &Conn| -> Option<ModificationDescriptor> { None });
    assert!(no_opinion.is_valid(&conn).unwrap());
}

#[test]
fn unconditional_requests_are_a_contract_violation() {
    let validator = modified_at(Some(lmt()));
    let conn = get("/");
    assert!(!validator.evaluate(&conn));
    assert_eq!(
        validator.is_valid(&conn),
        Err(Error::MissingConditionalHeader {
            validator: "ModificationValidator"
        })
    );

    assert!(modified_at(None).is_valid(&conn).unwrap());
    assert!(modified_at(Some(lmt()))
        .is_valid(&get("/?argument=true"))
        .unwrap());
}

#[test]
fn querystrings() {
    let validator = modified_at(Some(lmt() + Duration::from_secs(1)));
    let mut conn = get("/?argument=true").with_request_header("if-unmodified-since", LMT);
    assert!(validator.evaluate(&conn));
    assert!(validator.is_valid(&conn).unwrap());

    validator.update_response(&mut conn);
    assert_eq!(last_modified_header(&conn), None);

    let conn = get("/?argument=true").with_request_header("if-modified-since", LMT);
    assert!(modified_at(Some(lmt())).is_valid(&conn).unwrap());
}

#[test]
fn invalid_status_is_always_not_modified() {
    let validator = modified_at(Some(lmt() + Duration::from_secs(1)));

    let conn = get("/").with_request_header("if-modified-since", LMT);
    assert_eq!(validator.invalid_status(&conn), Status::NotModified);

    let conn = put("/").with_request_header("if-unmodified-since", LMT);
    assert!(!validator.is_valid(&conn).unwrap());
    assert_eq!(validator.invalid_status(&conn), Status::NotModified);
}

#[test]
fn update_response() {
    let mut conn = get("/").with_request_header("if-modified-since", LMT);
    modified_at(Some(lmt())).update_response(&mut conn);
    assert_eq!(last_modified_header(&conn), Some(LMT));
    assert_eq!(conn.status(), None);

    modified_at(Some(lmt() + Duration::from_secs(1))).update_response(&mut conn);
    assert_eq!(last_modified_header(&conn), Some(LMT));
}

#[test]
fn update_response_without_a_time() {
    let mut conn = get("/");
    modified_at(None).update_response(&mut conn);
    assert_eq!(last_modified_header(&conn), None);
}

#[test]
fn update_response_truncates_to_seconds() {
    let mut conn = get("/");
    modified_at(Some(lmt() + Duration::from_millis(999))).update_response(&mut conn);
    assert_eq!(last_modified_header(&conn), Some(LMT));
}

#[test]
fn reads_from_state_by_default() {
    let validator = ModificationValidator::from_state();
    let mut conn = get("/").with_request_header("if-modified-since", LMT);
    assert!(validator.is_valid(&conn).unwrap());

    conn.set_current_modification(lmt());
    assert!(!validator.is_valid(&conn).unwrap());
}

#[test]
fn reads_from_a_resource() {
    struct Document {
        updated_at: SystemTime,
    }

    impl Resource for Document {
        fn last_modified(&self) -> Option<SystemTime> {
            Some(self.updated_at)
        }
    }

    let validator = ModificationValidator::new(FromResource::<Document>::new());
    let mut conn = get("/").with_request_header("if-unmodified-since", LMT);
    conn.insert_state(Document {
        updated_at: lmt() + Duration::from_secs(60),
    });
    assert!(!validator.is_valid(&conn).unwrap());

    validator.update_response(&mut conn);
    assert_eq!(
        last_modified_header(&conn),
        Some("Sat, 06 Jan 2007 12:43:12 GMT")
    );
}
