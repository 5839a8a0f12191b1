use anyhow::Result;

use crate::api::musicbrainz::MusicBrainzClient;
use crate::models::{CoverArt, SearchCompletion, SearchRequest};
use crate::search::{LookupClient, ResultReporter, SearchOrchestrator};
use crate::tasks::cover_art::CoverArtSaverHandle;

pub struct AppController<C = MusicBrainzClient> {
    orchestrator: SearchOrchestrator<C>,
    saver: CoverArtSaverHandle,
}

impl<C: LookupClient> AppController<C> {
    pub fn new(orchestrator: SearchOrchestrator<C>, saver: CoverArtSaverHandle) -> Self {
        Self { orchestrator, saver }
    }

    pub fn submit(
        &mut self,
        artist: &str,
        release: &str,
        reporter: &mut impl ResultReporter,
    ) -> Option<(u64, SearchRequest)> {
        self.orchestrator.submit(artist, release, reporter)
    }

    pub fn complete(&self, completion: SearchCompletion, reporter: &mut impl ResultReporter) {
        self.orchestrator.complete(completion, reporter);
    }

    pub fn save(&self, request: SearchRequest, art: CoverArt) -> Result<()> {
        self.saver.enqueue(request, art)
    }
}
