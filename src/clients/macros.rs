/// Generates the lookup-by-code and insert methods every record client shares.
macro_rules! impl_client_methods {
    ($client_name:ident, $record:ty, $error:ty, $record_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                /// The underlying collection handle, for snapshots and tests.
                pub fn raw(&self) -> &$crate::actor_framework::CollectionClient {
                    &self.inner
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<find_ $record_name_snake>](&self, code: &str) -> Result<Option<$record>, $error> {
                    tracing::debug!("Sending request");
                    let found = self
                        .inner
                        .find_one(<$record as $crate::actor_framework::Record>::key_filter(code))
                        .await?;
                    Ok(found
                        .map(<$record as $crate::actor_framework::Record>::from_document)
                        .transpose()?)
                }

                #[tracing::instrument(skip(self, record))]
                pub async fn [<insert_ $record_name_snake>](&self, record: &$record) -> Result<(), $error> {
                    tracing::debug!(code = %$crate::actor_framework::Record::key(record), "Sending request");
                    let document = $crate::actor_framework::Record::to_document(record)?;
                    match self.inner.insert_one(document).await {
                        Ok(()) => Ok(()),
                        Err($crate::error::StoreError::DuplicateKey { key, .. }) => Err(<$error>::AlreadyExists(key)),
                        Err(e) => Err(e.into()),
                    }
                }
            }
        }
    };
}

macro_rules! impl_client_new {
    ($client_name:ident) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::CollectionClient) -> Self {
                Self { inner }
            }
        }
    };
}

macro_rules! impl_basic_client {
    ($client_name:ident, $record:ty, $error:ty, $record_name_snake:ident) => {
        impl_client_new!($client_name);
        impl_client_methods!($client_name, $record, $error, $record_name_snake);
    };
}
