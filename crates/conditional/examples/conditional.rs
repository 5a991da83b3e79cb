use std::time::SystemTime;
use trillium::Conn;
use trillium_conditional::{
    Conditional, EntityTagDescriptor, EntityTagValidator, FromResource, ModificationValidator,
    Resource,
};

#[derive(Clone, Debug)]
struct Document {
    revision: u64,
    updated_at: SystemTime,
}

impl Resource for Document {
    fn entity_tag(&self) -> Option<EntityTagDescriptor> {
        Some(EntityTagDescriptor::strong(format!("rev-{}", self.revision)))
    }

    fn last_modified(&self) -> Option<SystemTime> {
        Some(self.updated_at)
    }
}

pub fn app() -> impl trillium::Handler {
    let document = Document {
        revision: 1,
        updated_at: SystemTime::now(),
    };

    (
        move |mut conn: Conn| {
            let document = document.clone();
            async move {
                conn.insert_state(document);
                conn
            }
        },
        Conditional::new(|conn: Conn| async move {
            let revision = conn.state::<Document>().map_or(0, |document| document.revision);
            conn.ok(format!("revision {revision}"))
        })
        .with_validator(EntityTagValidator::new(FromResource::<Document>::new()))
        .with_validator(ModificationValidator::new(FromResource::<Document>::new())),
    )
}

pub fn main() {
    env_logger::init();
    trillium_smol::run(app());
}
