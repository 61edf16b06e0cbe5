//! Program-related API endpoints

use crate::{API_VERSION, GatewayClient};
use crate::error::{ClientError, Result};
use gateway_core::dto::page::Page;
use gateway_core::dto::program::{CreateProgram, ProgramView};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use uuid::Uuid;

impl GatewayClient {
    // =============================================================================
    // Program Management
    // =============================================================================

    /// List one page of programs, newest first
    ///
    /// # Arguments
    /// * `page` - 1-based page number; `None` requests the first page
    pub async fn list_programs(&self, page: Option<u64>) -> Result<Page<ProgramView>> {
        let mut url = self.programs_url();
        if let Some(page) = page {
            url.push_str(&format!("?page={}", page));
        }
        tracing::debug!("GET {}", url);
        let response = self.authorized(self.client.get(&url)).send().await?;

        self.handle_response(response, "program page").await
    }

    /// List every program by following the `next` links
    pub async fn list_all_programs(&self) -> Result<Vec<ProgramView>> {
        let mut programs = Vec::new();
        let mut url = Some(self.programs_url());

        while let Some(current) = url {
            tracing::debug!("GET {}", current);
            let response = self.authorized(self.client.get(&current)).send().await?;
            let page: Page<ProgramView> = self.handle_response(response, "program page").await?;

            programs.extend(page.results);
            url = page.next.map(|next| self.resolve_link(&next));
        }

        Ok(programs)
    }

    /// Get a program by ID
    pub async fn get_program(&self, program_id: Uuid) -> Result<ProgramView> {
        let url = format!("{}{}/", self.programs_url(), program_id);
        let response = self.authorized(self.client.get(&url)).send().await?;

        self.handle_response(response, &format!("program {}", program_id))
            .await
    }

    /// Upload a new program
    ///
    /// # Arguments
    /// * `req` - Program metadata
    /// * `artifact` - Tar archive holding the program files
    ///
    /// # Example
    /// ```no_run
    /// # use gateway_client::GatewayClient;
    /// # use gateway_core::dto::program::CreateProgram;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = GatewayClient::new("http://localhost:8080").with_token("secret");
    /// let archive = std::fs::read("program.tar")?;
    /// let program = client.create_program(CreateProgram {
    ///     title: "Awesome program".to_string(),
    ///     entrypoint: "program.py".to_string(),
    ///     ..Default::default()
    /// }, archive).await?;
    /// println!("Created program: {}", program.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_program(&self, req: CreateProgram, artifact: Vec<u8>) -> Result<ProgramView> {
        let form = program_form(req, artifact)?;
        let url = self.programs_url();
        let response = self
            .authorized(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;

        self.handle_response(response, "programs").await
    }

    /// Delete a program and its artifact
    pub async fn delete_program(&self, program_id: Uuid) -> Result<()> {
        let url = format!("{}{}/", self.programs_url(), program_id);
        let response = self.authorized(self.client.delete(&url)).send().await?;

        self.handle_empty_response(response, &format!("program {}", program_id))
            .await
    }

    /// Download the stored tar archive of a program
    pub async fn download_artifact(&self, program_id: Uuid) -> Result<Vec<u8>> {
        let url = format!("{}{}/artifact/", self.programs_url(), program_id);
        let response = self.authorized(self.client.get(&url)).send().await?;

        let response = self
            .check_status(response, &format!("artifact of program {}", program_id))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn programs_url(&self) -> String {
        format!("{}/{}/programs/", self.base_url, API_VERSION)
    }
}

/// Encode a create request as the multipart form the server expects.
/// Structured fields travel as JSON text.
fn program_form(req: CreateProgram, artifact: Vec<u8>) -> Result<Form> {
    let mut form = Form::new()
        .text("title", req.title)
        .text("entrypoint", req.entrypoint)
        .text("dependencies", to_json(&req.dependencies)?)
        .text("env_vars", to_json(&req.env_vars)?)
        .text("arguments", to_json(&req.arguments)?)
        .text("tags", to_json(&req.tags)?)
        .text("public", req.public.to_string());

    if let Some(description) = req.description {
        form = form.text("description", description);
    }
    if let Some(working_dir) = req.working_dir {
        form = form.text("working_dir", working_dir);
    }
    if let Some(version) = req.version {
        form = form.text("version", version);
    }

    let part = Part::bytes(artifact)
        .file_name("artifact.tar")
        .mime_str("application/x-tar")?;

    Ok(form.part("artifact", part))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| ClientError::InvalidRequest(e.to_string()))
}
