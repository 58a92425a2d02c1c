//! Messages and tonic stubs generated from `proto/product_service.proto`.

tonic::include_proto!("product_service");

/// Encoded `FileDescriptorSet` for the reflection service
pub const FILE_DESCRIPTOR_SET: &[u8] =
    tonic::include_file_descriptor_set!("product_service_descriptor");

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_descriptor_set_describes_both_services() {
        let set = prost_types::FileDescriptorSet::decode(FILE_DESCRIPTOR_SET).unwrap();
        let file = set
            .file
            .iter()
            .find(|f| f.name() == "product_service.proto")
            .unwrap();

        assert_eq!(file.package(), "product_service");

        let mut services: Vec<_> = file.service.iter().map(|s| s.name()).collect();
        services.sort();
        assert_eq!(services, vec!["CategoryService", "ProductService"]);

        let product = file
            .service
            .iter()
            .find(|s| s.name() == "ProductService")
            .unwrap();
        let methods: Vec<_> = product.method.iter().map(|m| m.name()).collect();
        assert_eq!(
            methods,
            vec!["Create", "GetByID", "GetList", "Update", "UpdatePatch", "Delete"]
        );
    }

    #[test]
    fn test_patch_fields_are_optional_on_the_wire() {
        let patch = UpdatePatchProduct {
            id: "p-1".to_string(),
            price: Some(0.0),
            ..Default::default()
        };

        let decoded = UpdatePatchProduct::decode(patch.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.price, Some(0.0));
        assert_eq!(decoded.name, None);
    }
}
