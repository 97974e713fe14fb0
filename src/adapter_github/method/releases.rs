use anyhow::Context;

use crate::adapter_github::entity::Release;

impl crate::adapter_github::Client {
    pub(crate) async fn get_latest_release(&self) -> anyhow::Result<Release> {
        let res = self
            .inner
            .get(&*self.endpoint)
            .send()
            .await
            .context("unable to request")?;
        res.error_for_status_ref()?;
        res.json().await.context("unable to read response")
    }
}
